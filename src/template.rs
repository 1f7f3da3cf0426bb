//! Changelog rendering.
//!
//! The structured changelog is flattened into [TemplateData] and rendered
//! with tera. Autoescaping is on so ticket text cannot inject markup; the
//! rendered output is entity-decoded before it reaches the terminal or
//! Slack.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tera::{Context, Tera};

use crate::config::{Config, JiraConfig};
use crate::error::{ChangelogError, Result};
use crate::tracker::{Changelog, ChangelogCommit, ReleaseVersion, Ticket};

/// Template used when `template.path` is not configured.
pub const DEFAULT_TEMPLATE: &str = r#"{% if jira.release_versions %}Release {{ jira.release_versions.0.name }}

{% endif -%}
Jira Tickets
---------------------
{% for ticket in tickets.approved -%}
* {{ ticket.issue_type }}: {{ ticket.summary }} [{{ ticket.key }}]{% if jira.base_url %} {{ jira.base_url }}/browse/{{ ticket.key }}{% endif %}
{% else -%}
~ None ~
{% endfor %}
Pending Approval
---------------------
{% for ticket in tickets.pending -%}
* {{ ticket.issue_type }}: {{ ticket.summary }} [{{ ticket.key }}] ({{ ticket.status }})
{% else -%}
~ None. Yay! ~
{% endfor %}
Other Commits
---------------------
{% for entry in commits.no_tickets -%}
* {{ entry.commit.revision | truncate(length=7, end="") }} {{ entry.commit.summary }} ({{ entry.commit.author_name }})
{% else -%}
~ None ~
{% endfor %}"#;

const TEMPLATE_NAME: &str = "changelog";

/// Values exposed to templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateData {
    pub jira: JiraData,
    pub commits: CommitGroups,
    pub tickets: TicketGroups,
}

#[derive(Debug, Clone, Serialize)]
pub struct JiraData {
    pub base_url: Option<String>,
    pub release_versions: Vec<ReleaseVersion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitGroups {
    pub all: Vec<ChangelogCommit>,
    pub tickets: Vec<ChangelogCommit>,
    pub no_tickets: Vec<ChangelogCommit>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketGroups {
    pub all: Vec<Ticket>,
    /// Tickets whose status is one of `jira.approval_statuses`
    pub approved: Vec<Ticket>,
    pub pending: Vec<Ticket>,
}

/// Groups the changelog for template consumption.
pub fn generate_template_data(
    config: &JiraConfig,
    changelog: &Changelog,
    base_url: Option<&str>,
) -> TemplateData {
    let (with_tickets, without_tickets): (Vec<_>, Vec<_>) = changelog
        .commits
        .iter()
        .cloned()
        .partition(|c| !c.tickets.is_empty());

    let (approved, pending): (Vec<_>, Vec<_>) = changelog
        .tickets
        .iter()
        .cloned()
        .partition(|t| config.approval_statuses.contains(&t.status));

    TemplateData {
        jira: JiraData {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            release_versions: changelog.release_versions.clone(),
        },
        commits: CommitGroups {
            all: changelog.commits.clone(),
            tickets: with_tickets,
            no_tickets: without_tickets,
        },
        tickets: TicketGroups {
            all: changelog.tickets.clone(),
            approved,
            pending,
        },
    }
}

/// Reads the configured template, or returns the built-in one.
pub fn load_template(config: &Config, repo_path: &Path) -> Result<String> {
    match &config.template.path {
        Some(path) => {
            let path = repo_path.join(path);
            fs::read_to_string(&path).map_err(|e| {
                ChangelogError::config(format!(
                    "Cannot read template {}: {}",
                    path.display(),
                    e
                ))
            })
        }
        None => Ok(DEFAULT_TEMPLATE.to_string()),
    }
}

/// Renders `data` with `template`.
///
/// The result still contains HTML entities for any escaped values; see
/// [decode_entities].
pub fn render_template(template: &str, data: &TemplateData) -> Result<String> {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![TEMPLATE_NAME]);
    tera.add_raw_template(TEMPLATE_NAME, template)?;

    let context = Context::from_serialize(data)?;
    Ok(tera.render(TEMPLATE_NAME, &context)?)
}

/// Resolves HTML entities (`&amp;`, `&lt;`, `&#x2F;` ...) to literal text.
pub fn decode_entities(rendered: &str) -> String {
    html_escape::decode_html_entities(rendered).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::CommitLog;
    use crate::tracker::assemble_changelog;
    use chrono::Utc;

    fn log(revision: &str, message: &str) -> CommitLog {
        CommitLog {
            revision: revision.to_string(),
            summary: message.to_string(),
            full_text: message.to_string(),
            author_name: "Grace".to_string(),
            author_email: "grace@example.com".to_string(),
            date: Utc::now(),
        }
    }

    fn ticket(key: &str, status: &str, summary: &str) -> Ticket {
        Ticket {
            key: key.to_string(),
            summary: summary.to_string(),
            issue_type: "Story".to_string(),
            status: status.to_string(),
            fix_versions: Vec::new(),
            assignee: None,
            reporter: None,
            commits: Vec::new(),
        }
    }

    fn sample_changelog() -> Changelog {
        let commits = vec![
            log("1111111aaaa", "PROJ-1 add search"),
            log("2222222bbbb", "PROJ-2 tweak"),
            log("3333333cccc", "bump deps"),
        ];
        let resolved = vec![
            vec![ticket("PROJ-1", "Done", "Search <beta> & filters")],
            vec![ticket("PROJ-2", "In Review", "Tweak layout")],
            vec![],
        ];
        assemble_changelog(commits, resolved, Vec::new())
    }

    #[test]
    fn test_generate_template_data_groups() {
        let data = generate_template_data(
            &JiraConfig::default(),
            &sample_changelog(),
            Some("https://jira.example.com/"),
        );

        assert_eq!(data.commits.all.len(), 3);
        assert_eq!(data.commits.tickets.len(), 2);
        assert_eq!(data.commits.no_tickets.len(), 1);
        assert_eq!(data.tickets.approved.len(), 1);
        assert_eq!(data.tickets.approved[0].key, "PROJ-1");
        assert_eq!(data.tickets.pending[0].key, "PROJ-2");
        assert_eq!(data.jira.base_url.as_deref(), Some("https://jira.example.com"));
    }

    #[test]
    fn test_default_template_renders_sections() {
        let data = generate_template_data(&JiraConfig::default(), &sample_changelog(), None);
        let rendered = render_template(DEFAULT_TEMPLATE, &data).unwrap();
        let message = decode_entities(&rendered);

        assert!(message.contains("Jira Tickets"));
        assert!(message.contains("* Story: Search <beta> & filters [PROJ-1]"));
        assert!(message.contains("[PROJ-2] (In Review)"));
        assert!(message.contains("* 3333333 bump deps (Grace)"));
        assert!(!message.contains("Release"));
    }

    #[test]
    fn test_rendering_escapes_before_decoding() {
        let data = generate_template_data(&JiraConfig::default(), &sample_changelog(), None);
        let rendered = render_template("{{ tickets.approved.0.summary }}", &data).unwrap();

        assert!(rendered.contains("&lt;beta&gt;"));
        assert_eq!(decode_entities(&rendered), "Search <beta> & filters");
    }

    #[test]
    fn test_release_header() {
        let mut changelog = sample_changelog();
        changelog.release_versions = vec![ReleaseVersion {
            project: "PROJ".to_string(),
            name: "v3.1".to_string(),
        }];
        let data = generate_template_data(&JiraConfig::default(), &changelog, None);
        let message = render_template(DEFAULT_TEMPLATE, &data).unwrap();
        assert!(message.starts_with("Release v3.1"));
    }

    #[test]
    fn test_invalid_template_is_error() {
        let data = generate_template_data(&JiraConfig::default(), &Changelog::default(), None);
        let err = render_template("{% for x in %}", &data).unwrap_err();
        assert!(matches!(err, ChangelogError::Template(_)));
    }

    #[test]
    fn test_load_template_from_repo_relative_path() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.tera"), "custom {{ tickets.all | length }}").unwrap();

        let mut config = Config::default();
        config.template.path = Some("notes.tera".into());
        let template = load_template(&config, dir.path()).unwrap();
        assert!(template.starts_with("custom"));

        config.template.path = Some("missing.tera".into());
        assert!(load_template(&config, dir.path()).is_err());
    }
}
