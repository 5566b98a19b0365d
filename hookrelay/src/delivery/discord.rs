//! Discord REST sink.
//!
//! Posts to `POST /channels/{id}/messages` with a bot token. Rate limits are
//! handled the way Discord recommends: no hardcoded limits, retry on 429
//! after the advertised delay.

use std::time::Duration;

use async_trait::async_trait;
use gh_render::NotificationMessage;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::ChatSink;
use crate::{Error, Result};

/// Public Discord API base.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Retries after the first 429; a request is sent at most this plus one times.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Upper bound on a single advertised rate-limit wait.
const MAX_RETRY_WAIT: Duration = Duration::from_secs(60);

pub struct DiscordSink {
    client: Client,
    api_base: String,
    token: String,
}

impl DiscordSink {
    pub fn new(client: Client, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn messages_url(&self, channel_id: &str) -> String {
        format!("{}/channels/{}/messages", self.api_base, channel_id)
    }

    /// Send request with rate limit handling.
    async fn send_with_retry(&self, channel_id: &str, payload: &Value) -> Result<()> {
        let url = self.messages_url(channel_id);
        let mut retries = 0;

        loop {
            let response = self
                .client
                .post(&url)
                .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
                .json(payload)
                .send()
                .await
                .map_err(|e| Error::delivery(format!("Discord request failed: {e}")))?;

            let status = response.status();

            if status.is_success() {
                return Ok(());
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                let retry_after = parse_retry_after(response.headers());

                if retries >= MAX_RATE_LIMIT_RETRIES {
                    warn!(
                        channel_id,
                        ?retry_after,
                        "Discord rate limit: max retries ({}) exceeded",
                        MAX_RATE_LIMIT_RETRIES
                    );
                    return Err(Error::delivery(format!(
                        "Discord rate limit exceeded after {MAX_RATE_LIMIT_RETRIES} retries"
                    )));
                }

                retries += 1;
                let wait = retry_after.unwrap_or(Duration::from_secs(1));
                debug!(
                    channel_id,
                    "Discord rate limited (429), waiting {:?} before retry {}/{}",
                    wait,
                    retries,
                    MAX_RATE_LIMIT_RETRIES
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            return Err(Error::delivery(format!(
                "Discord API returned {status}: {body}"
            )));
        }
    }
}

/// Parse the retry delay from 429 response headers, capped at
/// [`MAX_RETRY_WAIT`]. Negative and NaN values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    ["Retry-After", "X-RateLimit-Reset-After"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok()?.parse::<f64>().ok())
        .find(|secs| *secs >= 0.0)
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_or(MAX_RETRY_WAIT, |d| d.min(MAX_RETRY_WAIT))
        })
}

/// Discord message body carrying `message` as a single embed.
pub fn embed_payload(message: &NotificationMessage) -> Value {
    let mut embed = json!({ "title": message.title });

    if let Some(description) = &message.description {
        embed["description"] = json!(description);
    }
    if let Some(url) = &message.url {
        embed["url"] = json!(url);
    }
    if let Some(color) = message.color {
        embed["color"] = json!(color);
    }
    if let Some(author) = &message.author {
        embed["author"] = json!(author);
    }
    if !message.fields.is_empty() {
        embed["fields"] = json!(message.fields);
    }
    if let Some(footer) = &message.footer {
        embed["footer"] = json!({ "text": footer });
    }
    if let Some(timestamp) = message.timestamp {
        embed["timestamp"] = json!(timestamp.to_rfc3339());
    }

    json!({ "embeds": [embed] })
}

#[async_trait]
impl ChatSink for DiscordSink {
    async fn send_message(&self, channel_id: &str, message: &NotificationMessage) -> Result<()> {
        self.send_with_retry(channel_id, &embed_payload(message))
            .await?;
        debug!(channel_id, title = %message.title, "Discord message sent");
        Ok(())
    }

    async fn send_text(&self, channel_id: &str, content: &str) -> Result<()> {
        self.send_with_retry(channel_id, &json!({ "content": content }))
            .await
    }
}
