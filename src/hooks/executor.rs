use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{ChangelogError, Result};
use crate::hooks::{HookContext, HookType, ReleaseNameGenerator, SlackTransform};
use crate::template::TemplateData;

/// Runs a configured shell command as a hook
#[derive(Debug, Clone)]
pub struct CommandHook {
    command: String,
    repo_path: PathBuf,
}

impl CommandHook {
    pub fn new(command: impl Into<String>, repo_path: &Path) -> Self {
        CommandHook {
            command: command.into(),
            repo_path: repo_path.to_path_buf(),
        }
    }

    /// Execute the command with the given context
    ///
    /// The command runs through the platform shell inside the repository,
    /// with environment variables set from the context and `input` written
    /// to stdin. Exit code 0 means success; stdout is returned.
    ///
    /// # Returns
    /// * `Ok(String)` - Captured stdout
    /// * `Err` - If the command cannot start or exits non-zero
    pub async fn execute(&self, context: &HookContext, input: Option<&str>) -> Result<String> {
        let mut cmd = shell_command(&self.command);
        cmd.current_dir(&self.repo_path)
            .envs(context.to_env_vars())
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(hook = context.hook_type.name(), command = %self.command, "running hook");

        let mut child = cmd.spawn().map_err(|e| {
            ChangelogError::hook(format!("Failed to execute hook {}: {}", self.command, e))
        })?;

        // Stdin is written while stdout and stderr are drained.
        let writer = match (input, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => {
                let bytes = input.as_bytes().to_vec();
                Some(tokio::spawn(async move {
                    let written = stdin.write_all(&bytes).await;
                    drop(stdin);
                    written
                }))
            }
            _ => None,
        };

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            let written = writer
                .await
                .map_err(|e| ChangelogError::Io(std::io::Error::other(e)))?;
            // Commands may exit without reading their input.
            if let Err(e) = written {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChangelogError::hook(format!(
                "Hook {} failed with exit code {}\nStderr: {}",
                self.command,
                output.status.code().unwrap_or(-1),
                stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[async_trait]
impl ReleaseNameGenerator for CommandHook {
    async fn generate_release_version_name(&self) -> Result<String> {
        let context = HookContext {
            hook_type: HookType::GenerateReleaseVersionName,
            repo_path: self.repo_path.clone(),
            release: None,
        };

        let name = self.execute(&context, None).await?.trim().to_string();
        if name.is_empty() {
            return Err(ChangelogError::hook(format!(
                "Hook {} printed no release name",
                self.command
            )));
        }
        Ok(name)
    }
}

#[async_trait]
impl SlackTransform for CommandHook {
    async fn transform_for_slack(
        &self,
        message: &str,
        data: &TemplateData,
        release: Option<&str>,
    ) -> Result<String> {
        let context = HookContext {
            hook_type: HookType::TransformForSlack,
            repo_path: self.repo_path.clone(),
            release: release.map(str::to_string),
        };
        let input = json!({ "message": message, "data": data }).to_string();

        self.execute(&context, Some(&input)).await
    }
}
