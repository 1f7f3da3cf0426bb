use std::fmt;

/// Non-fatal conditions reported to the user.
///
/// None of these fail a run: they either end it early on purpose or skip
/// an optional step.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// `--release` had no value and no generator hook is configured
    ReleaseNameGeneratorMissing,
    /// `--slack` was given but no webhook endpoint is configured
    SlackNotConfigured,
    /// A webhook endpoint is configured but no channel
    SlackChannelMissing,
    /// The range selected no commits
    NoCommitsInRange { range: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::ReleaseNameGeneratorMissing => write!(
                f,
                "No release name given. Pass one with --release <name>, \
                 or set hooks.generate_release_version_name in the config file"
            ),
            BoundaryWarning::SlackNotConfigured => write!(
                f,
                "Slack is not configured: set slack.webhook_url or SLACK_WEBHOOK_URL to post the changelog"
            ),
            BoundaryWarning::SlackChannelMissing => write!(
                f,
                "No Slack channel configured: set slack.channel or SLACK_CHANNEL to post the changelog"
            ),
            BoundaryWarning::NoCommitsInRange { range } => {
                write!(f, "No commits found for range '{}'", range)
            }
        }
    }
}
