//! Commit source abstraction layer
//!
//! This module provides a trait-based abstraction over reading commit logs,
//! allowing for a real git implementation and a mock implementation for
//! testing.
//!
//! # Overview
//!
//! - [repository::Git2CommitSource]: reads history with the `git2` crate
//! - [mock::MockCommitSource]: returns canned logs and records calls
//!
//! Most code should depend on the [CommitSource] trait rather than concrete
//! implementations.

pub mod mock;
pub mod repository;

pub use mock::MockCommitSource;
pub use repository::Git2CommitSource;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::range::Range;

/// Commit information read from source control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitLog {
    /// The full commit hash
    pub revision: String,
    /// First line of the commit message
    pub summary: String,
    /// The complete commit message
    pub full_text: String,
    pub author_name: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
}

impl CommitLog {
    /// Abbreviated hash for display.
    pub fn short_revision(&self) -> &str {
        let end = self
            .revision
            .char_indices()
            .nth(7)
            .map(|(i, _)| i)
            .unwrap_or(self.revision.len());
        &self.revision[..end]
    }
}

/// Reads commit logs for a range
///
/// ## Range mapping
///
/// - `from`/`to` select commits reachable from `to` but not from `from`
///   (the `from..to` form of `git log`).
/// - `after`/`before` select commits reachable from `HEAD` whose commit
///   date is on or after `after` and strictly before `before`.
///
/// Logs are returned newest first.
#[async_trait]
pub trait CommitSource: Send + Sync {
    async fn commit_logs(&self, repo_path: &Path, range: &Range) -> Result<Vec<CommitLog>>;
}
