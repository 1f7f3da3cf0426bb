use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ChangelogError, Result};
use crate::range::Range;

/// Config file looked up in the repository root.
pub const REPO_CONFIG_FILE: &str = "changelog.config.toml";

/// Config file looked up in the user config directory.
pub const USER_CONFIG_FILE: &str = "jira-changelog.toml";

/// Slack rejects messages longer than this many characters.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4000;

/// Smallest message length that still leaves room for continuation markers.
pub const MIN_MESSAGE_LENGTH: usize = 16;

/// Represents the complete configuration for jira-changelog.
///
/// Contains the default commit range, Jira and Slack settings, template
/// selection and optional user hooks.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source_control: SourceControlConfig,

    #[serde(default)]
    pub jira: JiraConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub template: TemplateConfig,

    #[serde(default)]
    pub hooks: HooksConfig,
}

/// Source control settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SourceControlConfig {
    /// Range used when neither `--range` nor `--date` is given.
    #[serde(default)]
    pub default_range: Range,
}

/// Returns the default pattern used to find ticket keys in commit messages.
fn default_ticket_id_pattern() -> String {
    r"([A-Z][A-Z0-9]+-[0-9]+)".to_string()
}

/// Returns the default list of issue types left out of the changelog.
fn default_exclude_issue_types() -> Vec<String> {
    vec!["Sub-task".to_string()]
}

/// Returns the default list of statuses counted as approved.
fn default_approval_statuses() -> Vec<String> {
    vec![
        "Done".to_string(),
        "Closed".to_string(),
        "Accepted".to_string(),
    ]
}

/// Jira connection and ticket matching settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JiraConfig {
    #[serde(default)]
    pub api: JiraApiConfig,

    #[serde(default = "default_ticket_id_pattern")]
    pub ticket_id_pattern: String,

    #[serde(default = "default_exclude_issue_types")]
    pub exclude_issue_types: Vec<String>,

    #[serde(default = "default_approval_statuses")]
    pub approval_statuses: Vec<String>,
}

impl Default for JiraConfig {
    fn default() -> Self {
        JiraConfig {
            api: JiraApiConfig::default(),
            ticket_id_pattern: default_ticket_id_pattern(),
            exclude_issue_types: default_exclude_issue_types(),
            approval_statuses: default_approval_statuses(),
        }
    }
}

/// Jira REST API credentials.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct JiraApiConfig {
    /// Base URL, e.g. `https://example.atlassian.net`
    pub host: Option<String>,
    pub email: Option<String>,
    pub token: Option<String>,
}

fn default_username() -> String {
    "Jira Changelog".to_string()
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LENGTH
}

/// Slack delivery settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlackConfig {
    /// Incoming webhook endpoint. Delivery is enabled only when this is set.
    pub webhook_url: Option<String>,

    /// Destination channel id.
    pub channel: Option<String>,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl Default for SlackConfig {
    fn default() -> Self {
        SlackConfig {
            webhook_url: None,
            channel: None,
            username: default_username(),
            max_message_length: default_max_message_length(),
        }
    }
}

impl SlackConfig {
    pub fn is_enabled(&self) -> bool {
        self.webhook_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Template selection.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct TemplateConfig {
    /// Custom tera template. Relative paths resolve against the repository.
    pub path: Option<PathBuf>,
}

/// Shell commands used as user callbacks.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct HooksConfig {
    /// Prints the release name on stdout.
    pub generate_release_version_name: Option<String>,

    /// Reads `{"message", "data"}` JSON on stdin, prints the Slack message.
    pub transform_for_slack: Option<String>,
}

/// Loads configuration for a repository.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `changelog.config.toml` in the repository root
/// 3. `jira-changelog.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// Environment variables then fill settings the file left unset.
///
/// # Arguments
/// * `repo_path` - Absolute path of the repository being described
/// * `config_path` - Optional path to a custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(repo_path: &Path, config_path: Option<&Path>) -> Result<Config> {
    let mut config = match locate_config(repo_path, config_path) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let raw = fs::read_to_string(&path).map_err(|e| {
                ChangelogError::config(format!("Cannot read {}: {}", path.display(), e))
            })?;
            toml::from_str(&raw).map_err(|e| {
                ChangelogError::config(format!("Cannot parse {}: {}", path.display(), e))
            })?
        }
        None => {
            tracing::debug!("no config file found, using defaults");
            Config::default()
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate(&config)?;
    Ok(config)
}

fn locate_config(repo_path: &Path, config_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let repo_config = repo_path.join(REPO_CONFIG_FILE);
    if repo_config.exists() {
        return Some(repo_config);
    }

    let user_config = dirs::config_dir()?.join(USER_CONFIG_FILE);
    user_config.exists().then_some(user_config)
}

/// Fills unset secrets and Slack settings from the environment.
///
/// `JIRA_API_TOKEN`, `SLACK_WEBHOOK_URL` and `SLACK_CHANNEL` are read
/// through `lookup` so callers can supply their own source.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let fill = |slot: &mut Option<String>, key: &str| {
        if slot.is_none() {
            *slot = lookup(key).filter(|v| !v.is_empty());
        }
    };

    fill(&mut config.jira.api.token, "JIRA_API_TOKEN");
    fill(&mut config.slack.webhook_url, "SLACK_WEBHOOK_URL");
    fill(&mut config.slack.channel, "SLACK_CHANNEL");
}

fn validate(config: &Config) -> Result<()> {
    if config.slack.max_message_length < MIN_MESSAGE_LENGTH {
        return Err(ChangelogError::config(format!(
            "slack.max_message_length must be at least {}",
            MIN_MESSAGE_LENGTH
        )));
    }

    regex::Regex::new(&config.jira.ticket_id_pattern).map_err(|e| {
        ChangelogError::config(format!("Invalid jira.ticket_id_pattern: {}", e))
    })?;

    Ok(())
}
