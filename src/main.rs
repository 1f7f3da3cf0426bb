use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jira_changelog::cli::{run_changelog, ReleaseRequest, RunOptions};
use jira_changelog::ui;

#[derive(clap::Parser)]
#[command(
    name = "jira-changelog",
    version,
    about = "Generate a changelog from git commits and Jira tickets, and post it to Slack"
)]
struct Args {
    /// Repository to describe
    #[arg(default_value = ".")]
    dir: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    /// Commits reachable from TO but not from FROM (like `git log FROM..TO`),
    /// e.g. origin/prod...origin/main
    #[arg(short, long, value_name = "FROM...TO")]
    range: Option<String>,

    #[arg(
        short,
        long,
        value_name = "DATE[...DATE]",
        help = "Commits after a date, optionally before a second one"
    )]
    date: Option<String>,

    #[arg(short, long, help = "Post the changelog to Slack")]
    slack: bool,

    #[arg(
        long,
        value_name = "NAME",
        num_args = 0..=1,
        default_missing_value = "",
        help = "Assign tickets to a release; without NAME the configured generator names it"
    )]
    release: Option<String>,
}

impl From<Args> for RunOptions {
    fn from(args: Args) -> Self {
        RunOptions {
            working_dir: args.dir,
            config_path: args.config,
            range: args.range,
            date: args.date,
            slack: args.slack,
            release: ReleaseRequest::from_flag(args.release),
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let options = RunOptions::from(Args::parse());

    if let Err(e) = run(&options).await {
        tracing::error!(error = ?e, "changelog run failed");
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(options: &RunOptions) -> Result<()> {
    run_changelog(options).await.with_context(|| {
        format!(
            "Could not generate changelog for {}",
            options.working_dir.display()
        )
    })?;
    Ok(())
}

/// Console logging controlled by RUST_LOG (default: warn), on stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
