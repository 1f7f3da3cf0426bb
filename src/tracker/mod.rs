//! Issue tracker correlation
//!
//! Commits reference tickets by key in their messages (`PROJ-123`). A
//! tracker looks those tickets up, optionally assigns them to a release,
//! and returns the structured [Changelog] consumed by the template layer.

pub mod jira;
pub mod mock;

pub use jira::JiraTracker;
pub use mock::MockIssueTracker;

use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::git::CommitLog;

/// A tracker ticket referenced from at least one commit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub key: String,
    pub summary: String,
    pub issue_type: String,
    pub status: String,
    pub fix_versions: Vec<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    /// Commits mentioning this ticket, in log order
    pub commits: Vec<CommitLog>,
}

impl Ticket {
    /// Project part of the key (`PROJ` for `PROJ-123`).
    pub fn project(&self) -> &str {
        self.key.split('-').next().unwrap_or(&self.key)
    }
}

/// A commit together with the tickets it references
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangelogCommit {
    pub commit: CommitLog,
    pub tickets: Vec<Ticket>,
}

/// A release version a set of tickets was assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseVersion {
    pub project: String,
    pub name: String,
}

/// Commits correlated with tracker metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Changelog {
    pub commits: Vec<ChangelogCommit>,
    /// Unique tickets in first-seen order
    pub tickets: Vec<Ticket>,
    pub release_versions: Vec<ReleaseVersion>,
}

/// Correlates commits with tracker entries
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Builds the changelog for `commits`.
    ///
    /// When `release` is given, every referenced ticket is also assigned to
    /// that release version.
    async fn generate(&self, commits: Vec<CommitLog>, release: Option<&str>) -> Result<Changelog>;

    /// Base URL for linking tickets from templates.
    fn base_url(&self) -> Option<&str> {
        None
    }
}

/// Finds unique ticket keys in `text`, upper-cased, in order of appearance.
///
/// The first capture group of `pattern` is the key; patterns without groups
/// use the whole match.
pub fn extract_ticket_keys(pattern: &Regex, text: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();

    for captures in pattern.captures_iter(text) {
        let Some(m) = captures.get(1).or_else(|| captures.get(0)) else {
            continue;
        };
        let key = m.as_str().to_uppercase();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    keys
}

/// Assembles a [Changelog] from commits and their resolved tickets.
///
/// `resolved[i]` holds the tickets of `commits[i]`. Each unique ticket
/// collects every commit that mentions it.
pub fn assemble_changelog(
    commits: Vec<CommitLog>,
    resolved: Vec<Vec<Ticket>>,
    release_versions: Vec<ReleaseVersion>,
) -> Changelog {
    let mut tickets: Vec<Ticket> = Vec::new();
    let mut changelog_commits = Vec::with_capacity(commits.len());

    for (commit, commit_tickets) in commits.into_iter().zip(resolved) {
        for ticket in &commit_tickets {
            match tickets.iter_mut().find(|t| t.key == ticket.key) {
                Some(existing) => existing.commits.push(commit.clone()),
                None => {
                    let mut ticket = ticket.clone();
                    ticket.commits = vec![commit.clone()];
                    tickets.push(ticket);
                }
            }
        }

        changelog_commits.push(ChangelogCommit {
            commit,
            tickets: commit_tickets,
        });
    }

    Changelog {
        commits: changelog_commits,
        tickets,
        release_versions,
    }
}
