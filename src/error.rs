use thiserror::Error;

/// Unified error type for jira-changelog operations
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Issue tracker error: {0}")]
    Tracker(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Hook error: {0}")]
    Hook(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in jira-changelog
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangelogError::Config(msg.into())
    }

    /// Create an issue tracker error with context
    pub fn tracker(msg: impl Into<String>) -> Self {
        ChangelogError::Tracker(msg.into())
    }

    /// Create a hook error with context
    pub fn hook(msg: impl Into<String>) -> Self {
        ChangelogError::Hook(msg.into())
    }

    /// Create a delivery error with context
    pub fn delivery(msg: impl Into<String>) -> Self {
        ChangelogError::Delivery(msg.into())
    }

    /// Whether this error belongs to the delivery step.
    ///
    /// Delivery errors never fail a run whose changelog was already printed.
    pub fn is_delivery(&self) -> bool {
        matches!(self, ChangelogError::Delivery(_))
    }
}
