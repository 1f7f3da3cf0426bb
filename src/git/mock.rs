use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;

use crate::error::Result;
use crate::git::{CommitLog, CommitSource};
use crate::range::Range;

/// Mock commit source for testing without a repository
///
/// Returns the same logs for every range and records each requested range.
pub struct MockCommitSource {
    logs: Vec<CommitLog>,
    requests: Mutex<Vec<Range>>,
}

impl MockCommitSource {
    /// Create a mock returning no commits
    pub fn new() -> Self {
        MockCommitSource {
            logs: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock returning `logs`
    pub fn with_logs(logs: Vec<CommitLog>) -> Self {
        MockCommitSource {
            logs,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Ranges requested so far, in call order
    pub fn requests(&self) -> Vec<Range> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Default for MockCommitSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommitSource for MockCommitSource {
    async fn commit_logs(&self, _repo_path: &Path, range: &Range) -> Result<Vec<CommitLog>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(range.clone());
        }
        Ok(self.logs.clone())
    }
}
