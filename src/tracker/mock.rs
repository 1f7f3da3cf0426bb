use async_trait::async_trait;
use regex::Regex;
use std::sync::Mutex;

use crate::error::{ChangelogError, Result};
use crate::git::CommitLog;
use crate::tracker::{
    assemble_changelog, extract_ticket_keys, Changelog, IssueTracker, ReleaseVersion, Ticket,
};

/// Mock tracker resolving tickets from an in-memory list
pub struct MockIssueTracker {
    tickets: Vec<Ticket>,
    pattern: Regex,
    releases: Mutex<Vec<Option<String>>>,
    fail_with: Option<String>,
}

impl MockIssueTracker {
    /// Create a mock knowing `tickets`
    pub fn new(tickets: Vec<Ticket>) -> Self {
        MockIssueTracker {
            tickets,
            pattern: Regex::new(r"([A-Z][A-Z0-9]+-[0-9]+)").expect("valid ticket pattern"),
            releases: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    /// Create a mock whose `generate` always fails
    pub fn failing(message: impl Into<String>) -> Self {
        MockIssueTracker {
            fail_with: Some(message.into()),
            ..Self::new(Vec::new())
        }
    }

    /// Release arguments passed to `generate`, in call order
    pub fn releases(&self) -> Vec<Option<String>> {
        self.releases
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IssueTracker for MockIssueTracker {
    async fn generate(&self, commits: Vec<CommitLog>, release: Option<&str>) -> Result<Changelog> {
        if let Ok(mut releases) = self.releases.lock() {
            releases.push(release.map(str::to_string));
        }
        if let Some(message) = &self.fail_with {
            return Err(ChangelogError::tracker(message.clone()));
        }

        let resolved = commits
            .iter()
            .map(|commit| {
                extract_ticket_keys(&self.pattern, &commit.full_text)
                    .iter()
                    .filter_map(|key| self.tickets.iter().find(|t| &t.key == key).cloned())
                    .collect()
            })
            .collect();

        let release_versions = release
            .map(|name| {
                vec![ReleaseVersion {
                    project: "MOCK".to_string(),
                    name: name.to_string(),
                }]
            })
            .unwrap_or_default();

        Ok(assemble_changelog(commits, resolved, release_versions))
    }

    fn base_url(&self) -> Option<&str> {
        Some("https://jira.example.com")
    }
}
