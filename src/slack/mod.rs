//! Slack delivery
//!
//! - `chunker` - splits a message to fit the per-message size limit
//! - `dispatcher` - posts chunks strictly in order
//! - `webhook` - the HTTP transport

pub mod chunker;
pub mod dispatcher;
pub mod webhook;

pub use chunker::{split_message, CONTINUATION_MARKER};
pub use dispatcher::{check_transport, dispatch_all, ChatTransport};
pub use webhook::SlackWebhook;

use crate::error::{ChangelogError, Result};

/// Splits `message` to `limit` characters and posts every chunk in order.
///
/// # Returns
/// * `Ok(usize)` - Number of chunks delivered
/// * `Err` - If the message is blank or a chunk is rejected
pub async fn deliver(message: &str, limit: usize, transport: &dyn ChatTransport) -> Result<usize> {
    if message.trim().is_empty() {
        return Err(ChangelogError::delivery("the changelog message is empty"));
    }

    let chunks = split_message(message, limit);
    tracing::debug!(chunks = chunks.len(), limit, "split message for Slack");
    dispatch_all(&chunks, transport).await
}
