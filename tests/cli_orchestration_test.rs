use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::{Arc, Mutex};

use jira_changelog::boundary::BoundaryWarning;
use jira_changelog::cli::{
    ChangelogWorkflow, DeliveryStatus, ReleaseRequest, RunOptions, WorkflowOutcome,
};
use jira_changelog::config::Config;
use jira_changelog::git::{CommitLog, MockCommitSource};
use jira_changelog::hooks::{Hooks, ReleaseNameGenerator, SlackTransform};
use jira_changelog::slack::ChatTransport;
use jira_changelog::template::TemplateData;
use jira_changelog::tracker::{MockIssueTracker, Ticket};
use jira_changelog::{ChangelogError, Result};

fn log(revision: &str, message: &str) -> CommitLog {
    CommitLog {
        revision: revision.to_string(),
        summary: message.to_string(),
        full_text: message.to_string(),
        author_name: "Lin".to_string(),
        author_email: "lin@example.com".to_string(),
        date: Utc::now(),
    }
}

fn ticket(key: &str, summary: &str) -> Ticket {
    Ticket {
        key: key.to_string(),
        summary: summary.to_string(),
        issue_type: "Bug".to_string(),
        status: "Done".to_string(),
        fix_versions: Vec::new(),
        assignee: None,
        reporter: None,
        commits: Vec::new(),
    }
}

fn range_options() -> RunOptions {
    RunOptions {
        range: Some("v1.0.0...HEAD".to_string()),
        ..RunOptions::default()
    }
}

fn slack_config(max_message_length: usize) -> Config {
    let mut config = Config::default();
    config.slack.webhook_url = Some("https://hooks.example.com/T/B/x".to_string());
    config.slack.channel = Some("C42".to_string());
    config.slack.max_message_length = max_message_length;
    config
}

struct RecordingTransport {
    posts: Mutex<Vec<String>>,
    reject_at: Option<usize>,
}

impl RecordingTransport {
    fn new(reject_at: Option<usize>) -> Self {
        RecordingTransport {
            posts: Mutex::new(Vec::new()),
            reject_at,
        }
    }

    fn posts(&self) -> Vec<String> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn post(&self, text: &str) -> Result<()> {
        let mut posts = self.posts.lock().unwrap();
        posts.push(text.to_string());
        if Some(posts.len() - 1) == self.reject_at {
            return Err(ChangelogError::delivery("rate_limited"));
        }
        Ok(())
    }
}

struct FixedName(&'static str);

#[async_trait]
impl ReleaseNameGenerator for FixedName {
    async fn generate_release_version_name(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

struct Shout;

#[async_trait]
impl SlackTransform for Shout {
    async fn transform_for_slack(
        &self,
        message: &str,
        _data: &TemplateData,
        release: Option<&str>,
    ) -> Result<String> {
        Ok(format!("{} {}", release.unwrap_or("-"), message.to_uppercase()))
    }
}

#[tokio::test]
async fn test_release_without_generator_is_soft_exit() {
    let config = Config::default();
    let hooks = Hooks::default();
    let source = MockCommitSource::with_logs(vec![log("a1", "PROJ-1 fix")]);
    let tracker = MockIssueTracker::new(vec![]);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: None,
    };
    let options = RunOptions {
        release: ReleaseRequest::Generate,
        ..range_options()
    };

    let outcome = workflow.run(Path::new("."), &options).await.unwrap();

    assert_eq!(outcome, WorkflowOutcome::ReleaseNameUnavailable);
    assert!(source.requests().is_empty());
    assert!(tracker.releases().is_empty());
}

#[tokio::test]
async fn test_generated_release_name_reaches_tracker() {
    let config = Config::default();
    let hooks = Hooks {
        generate_release_version_name: Some(Arc::new(FixedName("2024.06"))),
        ..Hooks::default()
    };
    let source = MockCommitSource::with_logs(vec![log("a1", "PROJ-1 fix")]);
    let tracker = MockIssueTracker::new(vec![ticket("PROJ-1", "Crash on save")]);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: None,
    };
    let options = RunOptions {
        release: ReleaseRequest::Generate,
        ..range_options()
    };

    let outcome = workflow.run(Path::new("."), &options).await.unwrap();

    assert_eq!(tracker.releases(), vec![Some("2024.06".to_string())]);
    match outcome {
        WorkflowOutcome::Completed {
            message, release, ..
        } => {
            assert_eq!(release.as_deref(), Some("2024.06"));
            assert!(message.starts_with("Release 2024.06"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_run_without_slack_prints_changelog() {
    let config = Config::default();
    let hooks = Hooks::default();
    let source = MockCommitSource::with_logs(vec![
        log("a1b2c3d4e5", "PROJ-7 escape <script> & stuff"),
        log("f6f6f6f6f6", "chore: bump"),
    ]);
    let tracker = MockIssueTracker::new(vec![ticket("PROJ-7", "Escape <script> & stuff")]);
    let transport = RecordingTransport::new(None);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: Some(&transport),
    };

    let outcome = workflow.run(Path::new("."), &range_options()).await.unwrap();

    let range = &source.requests()[0];
    assert_eq!(range.from.as_deref(), Some("v1.0.0"));
    assert_eq!(range.to.as_deref(), Some("HEAD"));
    match outcome {
        WorkflowOutcome::Completed {
            message, delivery, ..
        } => {
            assert!(message.contains("Escape <script> & stuff [PROJ-7]"));
            assert!(message.contains("https://jira.example.com/browse/PROJ-7"));
            assert!(message.contains("f6f6f6f chore: bump"));
            assert_eq!(delivery, DeliveryStatus::NotRequested);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(transport.posts().is_empty());
}

#[tokio::test]
async fn test_missing_range_is_config_error() {
    let config = Config::default();
    let hooks = Hooks::default();
    let source = MockCommitSource::new();
    let tracker = MockIssueTracker::new(vec![]);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: None,
    };

    let err = workflow
        .run(Path::new("."), &RunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ChangelogError::Config(_)));
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_default_range_used_without_cli_range() {
    let mut config = Config::default();
    config.source_control.default_range.from = Some("origin/prod".to_string());
    config.source_control.default_range.to = Some("origin/main".to_string());
    let hooks = Hooks::default();
    let source = MockCommitSource::new();
    let tracker = MockIssueTracker::new(vec![]);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: None,
    };

    workflow
        .run(Path::new("."), &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(
        source.requests()[0],
        config.source_control.default_range
    );
}

#[tokio::test]
async fn test_tracker_failure_is_fatal() {
    let config = Config::default();
    let hooks = Hooks::default();
    let source = MockCommitSource::with_logs(vec![log("a1", "PROJ-1")]);
    let tracker = MockIssueTracker::failing("jira unavailable");
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: None,
    };

    let err = workflow
        .run(Path::new("."), &range_options())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("jira unavailable"));
}

#[tokio::test]
async fn test_slack_delivery_in_chunks() {
    let config = slack_config(200);
    let hooks = Hooks::default();
    let logs = (0..20)
        .map(|i| log(&format!("{:07}abc", i), &format!("maintenance commit number {}", i)))
        .collect();
    let source = MockCommitSource::with_logs(logs);
    let tracker = MockIssueTracker::new(vec![]);
    let transport = RecordingTransport::new(None);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: Some(&transport),
    };
    let options = RunOptions {
        slack: true,
        ..range_options()
    };

    let outcome = workflow.run(Path::new("."), &options).await.unwrap();

    let posts = transport.posts();
    assert!(posts.len() > 1);
    assert!(posts.iter().all(|p| p.chars().count() <= 200));
    match outcome {
        WorkflowOutcome::Completed {
            message, delivery, ..
        } => {
            assert_eq!(posts.concat(), message);
            assert_eq!(
                delivery,
                DeliveryStatus::Delivered {
                    chunks: posts.len()
                }
            );
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_chunk_does_not_fail_run() {
    let config = slack_config(200);
    let hooks = Hooks::default();
    let logs = (0..20)
        .map(|i| log(&format!("{:07}abc", i), &format!("maintenance commit number {}", i)))
        .collect();
    let source = MockCommitSource::with_logs(logs);
    let tracker = MockIssueTracker::new(vec![]);
    let transport = RecordingTransport::new(Some(1));
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: Some(&transport),
    };
    let options = RunOptions {
        slack: true,
        ..range_options()
    };

    let outcome = workflow.run(Path::new("."), &options).await.unwrap();

    assert_eq!(transport.posts().len(), 2);
    match outcome {
        WorkflowOutcome::Completed { delivery, .. } => match delivery {
            DeliveryStatus::Failed(reason) => assert!(reason.contains("rate_limited")),
            other => panic!("unexpected delivery {:?}", other),
        },
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[tokio::test]
async fn test_slack_without_endpoint_is_skipped() {
    let config = Config::default();
    let hooks = Hooks::default();
    let source = MockCommitSource::with_logs(vec![log("a1", "fix")]);
    let tracker = MockIssueTracker::new(vec![]);
    let transport = RecordingTransport::new(None);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: Some(&transport),
    };
    let options = RunOptions {
        slack: true,
        ..range_options()
    };

    let outcome = workflow.run(Path::new("."), &options).await.unwrap();

    assert!(transport.posts().is_empty());
    assert!(matches!(
        outcome,
        WorkflowOutcome::Completed {
            delivery: DeliveryStatus::Skipped(BoundaryWarning::SlackNotConfigured),
            ..
        }
    ));
}

#[tokio::test]
async fn test_slack_without_channel_is_skipped() {
    let mut config = slack_config(4000);
    config.slack.channel = None;
    let hooks = Hooks::default();
    let source = MockCommitSource::with_logs(vec![log("a1", "fix")]);
    let tracker = MockIssueTracker::new(vec![]);
    let transport = RecordingTransport::new(None);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: Some(&transport),
    };
    let options = RunOptions {
        slack: true,
        ..range_options()
    };

    let outcome = workflow.run(Path::new("."), &options).await.unwrap();

    assert!(transport.posts().is_empty());
    assert!(matches!(
        outcome,
        WorkflowOutcome::Completed {
            delivery: DeliveryStatus::Skipped(BoundaryWarning::SlackChannelMissing),
            ..
        }
    ));
}

#[tokio::test]
async fn test_transform_hook_shapes_slack_message() {
    let config = slack_config(4000);
    let hooks = Hooks {
        transform_for_slack: Some(Arc::new(Shout)),
        ..Hooks::default()
    };
    let source = MockCommitSource::with_logs(vec![log("a1", "tidy up")]);
    let tracker = MockIssueTracker::new(vec![]);
    let transport = RecordingTransport::new(None);
    let workflow = ChangelogWorkflow {
        config: &config,
        hooks: &hooks,
        source: &source,
        tracker: &tracker,
        transport: Some(&transport),
    };
    let options = RunOptions {
        slack: true,
        release: ReleaseRequest::Named("v5".to_string()),
        ..range_options()
    };

    let outcome = workflow.run(Path::new("."), &options).await.unwrap();

    let posts = transport.posts();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].starts_with("v5 RELEASE V5"));
    assert!(posts[0].contains("TIDY UP"));
    match outcome {
        WorkflowOutcome::Completed { message, .. } => assert!(message.contains("tidy up")),
        other => panic!("unexpected outcome {:?}", other),
    }
}
