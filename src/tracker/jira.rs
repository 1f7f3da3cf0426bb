use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::config::JiraConfig;
use crate::error::{ChangelogError, Result};
use crate::git::CommitLog;
use crate::tracker::{
    assemble_changelog, extract_ticket_keys, Changelog, IssueTracker, ReleaseVersion, Ticket,
};

const ISSUE_FIELDS: &str = "summary,status,issuetype,fixVersions,assignee,reporter";

/// Jira REST v2 client
pub struct JiraTracker {
    client: Client,
    host: String,
    email: Option<String>,
    token: Option<String>,
    ticket_pattern: Regex,
    exclude_issue_types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueFields {
    #[serde(default)]
    summary: String,
    status: Option<Named>,
    issuetype: Option<Named>,
    #[serde(default)]
    fix_versions: Vec<Named>,
    assignee: Option<User>,
    reporter: Option<User>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct User {
    display_name: String,
}

impl From<IssueResponse> for Ticket {
    fn from(issue: IssueResponse) -> Self {
        let fields = issue.fields;
        Ticket {
            key: issue.key,
            summary: fields.summary,
            issue_type: fields.issuetype.map(|t| t.name).unwrap_or_default(),
            status: fields.status.map(|s| s.name).unwrap_or_default(),
            fix_versions: fields.fix_versions.into_iter().map(|v| v.name).collect(),
            assignee: fields.assignee.map(|u| u.display_name),
            reporter: fields.reporter.map(|u| u.display_name),
            commits: Vec::new(),
        }
    }
}

impl JiraTracker {
    /// Creates a client from the `[jira]` config section.
    ///
    /// # Returns
    /// * `Err` - If no host is configured or the ticket pattern is invalid
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let host = config
            .api
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| ChangelogError::config("jira.api.host is not set"))?;

        let ticket_pattern = Regex::new(&config.ticket_id_pattern).map_err(|e| {
            ChangelogError::config(format!("Invalid jira.ticket_id_pattern: {}", e))
        })?;

        Ok(JiraTracker {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
            email: config.api.email.clone(),
            token: config.api.token.clone(),
            ticket_pattern,
            exclude_issue_types: config.exclude_issue_types.clone(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.email, &self.token) {
            (Some(email), token) => request.basic_auth(email, token.as_ref()),
            (None, Some(token)) => request.bearer_auth(token),
            (None, None) => request,
        }
    }

    /// Fetches a ticket. Unknown keys yield `Ok(None)`.
    async fn fetch_ticket(&self, key: &str) -> Result<Option<Ticket>> {
        let url = format!("{}/rest/api/2/issue/{}", self.host, key);
        debug!("Fetching ticket {}", key);

        let response = self
            .authorize(self.client.get(&url))
            .query(&[("fields", ISSUE_FIELDS)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("Ticket {} not found in Jira, ignoring", key);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChangelogError::tracker(format!(
                "Fetching {} failed with {}: {}",
                key, status, body
            )));
        }

        let issue: IssueResponse = response.json().await?;
        let ticket = Ticket::from(issue);

        if self.exclude_issue_types.contains(&ticket.issue_type) {
            debug!("Skipping {} with excluded type {}", key, ticket.issue_type);
            return Ok(None);
        }

        Ok(Some(ticket))
    }

    /// Makes sure `release` exists as a version of `project`.
    async fn ensure_version(&self, project: &str, release: &str) -> Result<()> {
        let url = format!("{}/rest/api/2/project/{}/versions", self.host, project);
        let response = self.authorize(self.client.get(&url)).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChangelogError::tracker(format!(
                "Listing versions of {} failed with {}: {}",
                project, status, body
            )));
        }

        let versions: Vec<Named> = response.json().await?;
        if versions.iter().any(|v| v.name == release) {
            return Ok(());
        }

        info!("Creating version {} in project {}", release, project);
        let url = format!("{}/rest/api/2/version", self.host);
        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "name": release, "project": project }))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChangelogError::tracker(format!(
                "Creating version {} in {} failed with {}: {}",
                release, project, status, body
            )));
        }

        Ok(())
    }

    /// Adds `release` to the fix versions of `ticket`.
    async fn assign_fix_version(&self, ticket: &mut Ticket, release: &str) -> Result<()> {
        if ticket.fix_versions.iter().any(|v| v == release) {
            return Ok(());
        }

        let url = format!("{}/rest/api/2/issue/{}", self.host, ticket.key);
        let response = self
            .authorize(self.client.put(&url))
            .json(&json!({ "update": { "fixVersions": [{ "add": { "name": release } }] } }))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChangelogError::tracker(format!(
                "Assigning {} to {} failed with {}: {}",
                release, ticket.key, status, body
            )));
        }

        ticket.fix_versions.push(release.to_string());
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for JiraTracker {
    async fn generate(&self, commits: Vec<CommitLog>, release: Option<&str>) -> Result<Changelog> {
        let mut cache: HashMap<String, Option<Ticket>> = HashMap::new();
        let mut keys_per_commit = Vec::with_capacity(commits.len());

        for commit in &commits {
            let keys = extract_ticket_keys(&self.ticket_pattern, &commit.full_text);
            for key in &keys {
                if !cache.contains_key(key) {
                    let ticket = self.fetch_ticket(key).await?;
                    cache.insert(key.clone(), ticket);
                }
            }
            keys_per_commit.push(keys);
        }

        let mut release_versions = Vec::new();
        if let Some(release) = release {
            let mut projects: Vec<String> = cache
                .values()
                .flatten()
                .map(|t| t.project().to_string())
                .collect();
            projects.sort();
            projects.dedup();

            for project in projects {
                self.ensure_version(&project, release).await?;
                release_versions.push(ReleaseVersion {
                    project,
                    name: release.to_string(),
                });
            }

            let mut keys: Vec<String> = cache.keys().cloned().collect();
            keys.sort();
            for key in keys {
                if let Some(Some(ticket)) = cache.get_mut(&key) {
                    self.assign_fix_version(ticket, release).await?;
                }
            }
        }

        let resolved = keys_per_commit
            .iter()
            .map(|keys| {
                keys.iter()
                    .filter_map(|k| cache.get(k).cloned().flatten())
                    .collect()
            })
            .collect();

        Ok(assemble_changelog(commits, resolved, release_versions))
    }

    fn base_url(&self) -> Option<&str> {
        Some(&self.host)
    }
}
