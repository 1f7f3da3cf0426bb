use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Points in the changelog workflow where user commands can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookType {
    GenerateReleaseVersionName,
    TransformForSlack,
}

impl HookType {
    /// Get the hook name as a string
    pub fn name(&self) -> &'static str {
        match self {
            HookType::GenerateReleaseVersionName => "generate-release-version-name",
            HookType::TransformForSlack => "transform-for-slack",
        }
    }
}

/// Context information passed to a hook
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Type of hook being executed
    pub hook_type: HookType,
    /// Repository the changelog describes
    pub repo_path: PathBuf,
    /// Release name, once known
    pub release: Option<String>,
}

impl HookContext {
    /// Convert context to environment variables for the hook command
    ///
    /// Maps context fields to CHANGELOG_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("CHANGELOG_HOOK".to_string(), self.hook_type.name().to_string());
        env.insert(
            "CHANGELOG_REPO_PATH".to_string(),
            self.repo_path.display().to_string(),
        );

        if let Some(ref release) = self.release {
            env.insert("CHANGELOG_RELEASE".to_string(), release.clone());
        }

        env
    }
}
