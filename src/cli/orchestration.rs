//! Main workflow orchestration logic
//!
//! This module contains the changelog workflow, kept apart from CLI
//! argument parsing. [run_changelog] wires the real collaborators;
//! [ChangelogWorkflow] runs the pipeline against whatever implementations
//! it is given.

use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::boundary::BoundaryWarning;
use crate::config::{self, Config};
use crate::error::{ChangelogError, Result};
use crate::git::{CommitSource, Git2CommitSource};
use crate::hooks::Hooks;
use crate::range;
use crate::slack::{self, check_transport, ChatTransport, SlackWebhook};
use crate::template::{self, TemplateData};
use crate::tracker::{IssueTracker, JiraTracker};
use crate::ui;

/// What `--release` asked for
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReleaseRequest {
    /// Flag absent
    #[default]
    None,
    /// Flag given without a value: ask the generator hook
    Generate,
    /// Flag given with a value
    Named(String),
}

impl ReleaseRequest {
    /// Interprets the raw flag value; an empty value means "generate one".
    pub fn from_flag(flag: Option<String>) -> Self {
        match flag {
            None => ReleaseRequest::None,
            Some(name) if name.trim().is_empty() => ReleaseRequest::Generate,
            Some(name) => ReleaseRequest::Named(name.trim().to_string()),
        }
    }
}

/// Options for one changelog run
///
/// Mirrors the CLI flags in a form that does not depend on clap. Built once
/// at startup and never modified.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunOptions {
    /// Repository to describe
    pub working_dir: PathBuf,

    /// Path to custom config file
    pub config_path: Option<PathBuf>,

    /// `<from>...<to>` revision range
    pub range: Option<String>,

    /// `<date>[...<date>]` date range
    pub date: Option<String>,

    /// Post the changelog to Slack
    pub slack: bool,

    pub release: ReleaseRequest,
}

/// Result of the optional Slack step
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryStatus {
    NotRequested,
    Skipped(BoundaryWarning),
    Delivered { chunks: usize },
    Failed(String),
}

/// Result of a changelog run that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// `--release` without a name and no generator: stopped before any work
    ReleaseNameUnavailable,
    Completed {
        /// The decoded changelog as printed
        message: String,
        release: Option<String>,
        delivery: DeliveryStatus,
    },
}

/// The changelog pipeline over injected collaborators
pub struct ChangelogWorkflow<'a> {
    pub config: &'a Config,
    pub hooks: &'a Hooks,
    pub source: &'a dyn CommitSource,
    pub tracker: &'a dyn IssueTracker,
    /// Present only when Slack is configured
    pub transport: Option<&'a dyn ChatTransport>,
}

impl ChangelogWorkflow<'_> {
    /// Runs the pipeline for the repository at `repo_path`:
    /// 1. Settle the release name
    /// 2. Resolve the commit range
    /// 3. Read commit logs
    /// 4. Correlate with the issue tracker
    /// 5. Render and decode the changelog
    /// 6. Print it
    /// 7. Post it to Slack when requested
    ///
    /// # Returns
    /// * `Ok(WorkflowOutcome)` - Including runs whose Slack delivery failed
    /// * `Err` - If any step up to printing failed
    pub async fn run(&self, repo_path: &Path, options: &RunOptions) -> Result<WorkflowOutcome> {
        if release_name_unavailable(&options.release, self.hooks) {
            ui::display_boundary_warning(&BoundaryWarning::ReleaseNameGeneratorMissing);
            return Ok(WorkflowOutcome::ReleaseNameUnavailable);
        }
        let release = match &options.release {
            ReleaseRequest::None => None,
            ReleaseRequest::Named(name) => Some(name.clone()),
            ReleaseRequest::Generate => match &self.hooks.generate_release_version_name {
                Some(generator) => Some(generator.generate_release_version_name().await?),
                None => None,
            },
        };
        if let Some(release) = &release {
            debug!("Release: {}", release);
        }

        let range = range::resolve(
            options.range.as_deref(),
            options.date.as_deref(),
            &self.config.source_control.default_range,
        )?;
        debug!("Range: {}", range);

        let commits = self.source.commit_logs(repo_path, &range).await?;
        if commits.is_empty() {
            ui::display_boundary_warning(&BoundaryWarning::NoCommitsInRange {
                range: range.to_string(),
            });
        }

        let changelog = self.tracker.generate(commits, release.as_deref()).await?;
        debug!(
            "Correlated {} commits with {} tickets",
            changelog.commits.len(),
            changelog.tickets.len()
        );

        let data =
            template::generate_template_data(&self.config.jira, &changelog, self.tracker.base_url());
        let source = template::load_template(self.config, repo_path)?;
        let rendered = template::render_template(&source, &data)?;
        let message = template::decode_entities(&rendered);

        ui::display_changelog(&message);

        let delivery = if options.slack {
            self.deliver(&message, &data, release.as_deref()).await
        } else {
            DeliveryStatus::NotRequested
        };

        Ok(WorkflowOutcome::Completed {
            message,
            release,
            delivery,
        })
    }

    /// Posts to Slack. Failures are reported here and never propagate.
    async fn deliver(
        &self,
        message: &str,
        data: &TemplateData,
        release: Option<&str>,
    ) -> DeliveryStatus {
        let transport = match (check_transport(&self.config.slack), self.transport) {
            (Err(warning), _) => {
                ui::display_boundary_warning(&warning);
                return DeliveryStatus::Skipped(warning);
            }
            (Ok(()), None) => {
                let warning = BoundaryWarning::SlackNotConfigured;
                ui::display_boundary_warning(&warning);
                return DeliveryStatus::Skipped(warning);
            }
            (Ok(()), Some(transport)) => transport,
        };

        ui::display_status("Sending changelog to Slack...");
        match self.try_deliver(message, data, release, transport).await {
            Ok(chunks) => {
                let channel = self.config.slack.channel().unwrap_or_default();
                ui::display_success(&ui::format_delivery_summary(chunks, channel));
                DeliveryStatus::Delivered { chunks }
            }
            Err(e) => {
                error!(error = ?e, "Slack delivery failed");
                ui::display_error(&format!("Could not post changelog to Slack: {}", e));
                DeliveryStatus::Failed(e.to_string())
            }
        }
    }

    async fn try_deliver(
        &self,
        message: &str,
        data: &TemplateData,
        release: Option<&str>,
        transport: &dyn ChatTransport,
    ) -> Result<usize> {
        let message = match &self.hooks.transform_for_slack {
            Some(transform) => transform.transform_for_slack(message, data, release).await?,
            None => message.to_string(),
        };

        slack::deliver(&message, self.config.slack.max_message_length, transport).await
    }
}

/// Runs a changelog with the production collaborators.
///
/// Resolves the working directory, loads its configuration, then hands
/// over to [ChangelogWorkflow::run].
pub async fn run_changelog(options: &RunOptions) -> Result<WorkflowOutcome> {
    let repo_path = resolve_working_dir(&options.working_dir)?;
    debug!("Repository: {}", repo_path.display());

    let config = config::load_config(&repo_path, options.config_path.as_deref())?;
    let hooks = Hooks::from_config(&config.hooks, &repo_path);
    if release_name_unavailable(&options.release, &hooks) {
        ui::display_boundary_warning(&BoundaryWarning::ReleaseNameGeneratorMissing);
        return Ok(WorkflowOutcome::ReleaseNameUnavailable);
    }

    let source = Git2CommitSource::new();
    let tracker = JiraTracker::new(&config.jira)?;
    let webhook = if options.slack {
        SlackWebhook::new(&config.slack).ok()
    } else {
        None
    };

    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: webhook.as_ref().map(|w| w as &dyn ChatTransport),
    };

    workflow.run(&repo_path, options).await
}

/// Whether `--release` asked for a generated name that no hook can provide.
fn release_name_unavailable(request: &ReleaseRequest, hooks: &Hooks) -> bool {
    *request == ReleaseRequest::Generate && hooks.generate_release_version_name.is_none()
}

/// Absolute path of the working directory.
pub fn resolve_working_dir(working_dir: &Path) -> Result<PathBuf> {
    let dir = if working_dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        working_dir
    };

    dir.canonicalize().map_err(|e| {
        ChangelogError::config(format!(
            "Cannot access working directory {}: {}",
            dir.display(),
            e
        ))
    })
}
