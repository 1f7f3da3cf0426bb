use async_trait::async_trait;
use tracing::{debug, info};

use crate::boundary::BoundaryWarning;
use crate::config::SlackConfig;
use crate::error::{ChangelogError, Result};

/// Delivers one message to the chat channel
///
/// Implementations must return an error when the destination did not
/// explicitly accept the message, even if the request itself succeeded.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(&self, text: &str) -> Result<()>;
}

/// Checks that delivery can be attempted at all.
///
/// # Returns
/// * `Ok(())` - An endpoint and a channel are configured
/// * `Err(BoundaryWarning)` - Delivery should be skipped with this diagnostic
pub fn check_transport(config: &SlackConfig) -> std::result::Result<(), BoundaryWarning> {
    if !config.is_enabled() {
        return Err(BoundaryWarning::SlackNotConfigured);
    }
    if config.channel().is_none() {
        return Err(BoundaryWarning::SlackChannelMissing);
    }
    Ok(())
}

/// Sends `chunks` one after another.
///
/// Each post starts only after the previous one was accepted, so the
/// channel shows the chunks in order. The first rejection stops the
/// sequence; chunks already delivered stay delivered.
///
/// # Returns
/// * `Ok(usize)` - Number of chunks delivered (all of them)
/// * `Err(ChangelogError::Delivery)` - Naming the rejected chunk
pub async fn dispatch_all(chunks: &[String], transport: &dyn ChatTransport) -> Result<usize> {
    let total = chunks.len();

    for (i, chunk) in chunks.iter().enumerate() {
        debug!("Posting chunk {}/{} ({} chars)", i + 1, total, chunk.chars().count());

        transport.post(chunk).await.map_err(|e| {
            ChangelogError::delivery(format!(
                "chunk {}/{} was rejected after {} delivered: {}",
                i + 1,
                total,
                i,
                e
            ))
        })?;
    }

    info!("Delivered {} chunk(s) to Slack", total);
    Ok(total)
}
