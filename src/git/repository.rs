use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use git2::{Commit, Repository as Git2Repo, Sort};
use std::path::{Path, PathBuf};

use crate::error::{ChangelogError, Result};
use crate::git::{CommitLog, CommitSource};
use crate::range::Range;

/// Reads commit logs with libgit2
///
/// The repository is opened per call on a blocking thread, since
/// `git2::Repository` cannot be shared across await points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2CommitSource;

impl Git2CommitSource {
    pub fn new() -> Self {
        Git2CommitSource
    }
}

#[async_trait]
impl CommitSource for Git2CommitSource {
    async fn commit_logs(&self, repo_path: &Path, range: &Range) -> Result<Vec<CommitLog>> {
        let repo_path: PathBuf = repo_path.to_path_buf();
        let range = range.clone();

        tokio::task::spawn_blocking(move || read_commit_logs(&repo_path, &range))
            .await
            .map_err(|e| ChangelogError::Io(std::io::Error::other(e)))?
    }
}

/// Walks the history of the repository at `repo_path` for `range`.
pub fn read_commit_logs(repo_path: &Path, range: &Range) -> Result<Vec<CommitLog>> {
    let repo = Git2Repo::discover(repo_path)?;
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TIME)?;

    if range.is_revision_range() {
        let to = range.to.as_deref().unwrap_or("HEAD");
        let to_oid = repo
            .revparse_single(to)
            .map_err(|e| ChangelogError::config(format!("Cannot resolve '{}': {}", to, e)))?
            .peel_to_commit()?
            .id();
        revwalk.push(to_oid)?;

        if let Some(from) = range.from.as_deref() {
            let from_oid = repo
                .revparse_single(from)
                .map_err(|e| ChangelogError::config(format!("Cannot resolve '{}': {}", from, e)))?
                .peel_to_commit()?
                .id();
            revwalk.hide(from_oid)?;
        }
    } else {
        revwalk.push_head()?;
    }

    let after = range.after.map(start_of_day);
    let before = range.before.map(start_of_day);

    let mut logs = Vec::new();
    for oid in revwalk {
        let commit = repo.find_commit(oid?)?;
        let log = to_commit_log(&commit);

        if after.is_some_and(|after| log.date < after) {
            continue;
        }
        if before.is_some_and(|before| log.date >= before) {
            continue;
        }

        logs.push(log);
    }

    tracing::debug!(count = logs.len(), range = %range, "read commit logs");
    Ok(logs)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

fn to_commit_log(commit: &Commit<'_>) -> CommitLog {
    let full_text = commit.message().unwrap_or("(empty message)").to_string();
    let summary = full_text.lines().next().unwrap_or("").trim().to_string();
    let author = commit.author();
    let date = DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default();

    CommitLog {
        revision: commit.id().to_string(),
        summary,
        full_text,
        author_name: author.name().unwrap_or("unknown").to_string(),
        author_email: author.email().unwrap_or("").to_string(),
        date,
    }
}
