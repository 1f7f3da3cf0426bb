use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::SlackConfig;
use crate::error::{ChangelogError, Result};
use crate::slack::dispatcher::ChatTransport;

/// Posts messages to a Slack webhook endpoint
pub struct SlackWebhook {
    client: Client,
    url: String,
    channel: String,
    username: String,
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    channel: &'a str,
    username: &'a str,
    text: &'a str,
    blocks: [Block<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Block<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: BlockText<'a>,
}

#[derive(Debug, Serialize)]
struct BlockText<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    #[serde(default)]
    ok: bool,
    error: Option<String>,
}

impl SlackWebhook {
    /// Creates a transport from the `[slack]` config section.
    ///
    /// # Returns
    /// * `Err` - If the endpoint or the channel is missing
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let url = config
            .webhook_url
            .as_deref()
            .filter(|_| config.is_enabled())
            .ok_or_else(|| ChangelogError::delivery("slack.webhook_url is not set"))?;
        let channel = config
            .channel()
            .ok_or_else(|| ChangelogError::delivery("slack.channel is not set"))?;

        Ok(SlackWebhook {
            client: Client::new(),
            url: url.trim().to_string(),
            channel: channel.to_string(),
            username: config.username.clone(),
        })
    }
}

/// Interprets a webhook response body.
///
/// Accepts the plain-text `ok` of incoming webhooks and the JSON
/// `{"ok": true}` of the Web API. Anything else, including a JSON body with
/// an `error` field, is a rejection.
fn check_acknowledgement(body: &str) -> Result<()> {
    let body = body.trim();
    if body == "ok" {
        return Ok(());
    }

    match serde_json::from_str::<SlackResponse>(body) {
        Ok(SlackResponse { error: Some(error), .. }) => Err(ChangelogError::delivery(error)),
        Ok(SlackResponse { ok: true, .. }) => Ok(()),
        _ => Err(ChangelogError::delivery(format!(
            "no ok acknowledgement in response: {}",
            body
        ))),
    }
}

#[async_trait]
impl ChatTransport for SlackWebhook {
    async fn post(&self, text: &str) -> Result<()> {
        let payload = Payload {
            channel: &self.channel,
            username: &self.username,
            text,
            blocks: [Block {
                kind: "section",
                text: BlockText {
                    kind: "mrkdwn",
                    text,
                },
            }],
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(ChangelogError::delivery(format!(
                "HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        check_acknowledgement(&body)
    }
}
