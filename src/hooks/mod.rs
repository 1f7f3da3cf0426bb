//! User callbacks
//!
//! Two optional capabilities can be configured:
//! - release-name generator: names the release when `--release` has no value
//! - Slack transform: rewrites the message before it is posted to Slack
//!
//! Each is an `Option` on [Hooks]; callers check for presence before use.
//! The shipped implementation runs a shell command ([CommandHook]).

pub mod executor;
pub mod lifecycle;

pub use executor::CommandHook;
pub use lifecycle::{HookContext, HookType};

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::HooksConfig;
use crate::error::Result;
use crate::template::TemplateData;

/// Produces a release name on demand
#[async_trait]
pub trait ReleaseNameGenerator: Send + Sync {
    async fn generate_release_version_name(&self) -> Result<String>;
}

/// Rewrites the changelog message before Slack delivery
#[async_trait]
pub trait SlackTransform: Send + Sync {
    async fn transform_for_slack(
        &self,
        message: &str,
        data: &TemplateData,
        release: Option<&str>,
    ) -> Result<String>;
}

/// Configured callbacks for one run
#[derive(Clone, Default)]
pub struct Hooks {
    pub generate_release_version_name: Option<Arc<dyn ReleaseNameGenerator>>,
    pub transform_for_slack: Option<Arc<dyn SlackTransform>>,
}

impl Hooks {
    /// Builds command hooks from the `[hooks]` config section.
    pub fn from_config(config: &HooksConfig, repo_path: &Path) -> Self {
        let command = |cmd: &Option<String>| {
            cmd.as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| CommandHook::new(c, repo_path))
        };

        Hooks {
            generate_release_version_name: command(&config.generate_release_version_name)
                .map(|h| Arc::new(h) as Arc<dyn ReleaseNameGenerator>),
            transform_for_slack: command(&config.transform_for_slack)
                .map(|h| Arc::new(h) as Arc<dyn SlackTransform>),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field(
                "generate_release_version_name",
                &self.generate_release_version_name.is_some(),
            )
            .field("transform_for_slack", &self.transform_for_slack.is_some())
            .finish()
    }
}
