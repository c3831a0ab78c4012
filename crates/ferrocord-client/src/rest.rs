//! Outbound message sending
//!
//! The stateless "send payload to a resource" collaborator. Failures are
//! logged and swallowed to `None` so a failed reply never crashes a
//! command handler.

use async_trait::async_trait;
use serde_json::{json, Value};

/// Accent color applied to embeds
pub const EMBED_ACCENT_COLOR: u32 = 0x5865F2;

/// Rich-content payload for [`OutboundMessage::Embed`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub title: String,
    pub description: String,
}

impl Embed {
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Content posted to a channel: plain text or a structured payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text(String),
    Embed(Embed),
}

impl OutboundMessage {
    /// REST request body for this message
    #[must_use]
    pub fn into_body(self) -> Value {
        match self {
            Self::Text(content) => json!({ "content": content }),
            Self::Embed(embed) => json!({
                "embeds": [{
                    "title": embed.title,
                    "description": embed.description,
                    "color": EMBED_ACCENT_COLOR,
                }]
            }),
        }
    }
}

impl From<&str> for OutboundMessage {
    fn from(content: &str) -> Self {
        Self::Text(content.to_string())
    }
}

impl From<String> for OutboundMessage {
    fn from(content: String) -> Self {
        Self::Text(content)
    }
}

impl From<Embed> for OutboundMessage {
    fn from(embed: Embed) -> Self {
        Self::Embed(embed)
    }
}

/// Sends a payload to a channel over the authenticated REST API
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Post a message; returns the response body, or `None` on any failure
    async fn send(&self, channel_id: &str, message: OutboundMessage) -> Option<Value>;
}

/// Production sender backed by the REST API
pub struct RestSender {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl RestSender {
    /// Create a sender against the given API base URL
    #[must_use]
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl MessageSender for RestSender {
    async fn send(&self, channel_id: &str, message: OutboundMessage) -> Option<Value> {
        let url = format!("{}/channels/{channel_id}/messages", self.api_base);

        let response = match self
            .http
            .post(&url)
            .header("Authorization", format!("Bot {}", self.token))
            .json(&message.into_body())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(channel_id = %channel_id, error = %e, "Send request failed");
                return None;
            }
        };

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            tracing::warn!(
                channel_id = %channel_id,
                status = status.as_u16(),
                body = %body,
                "Send rejected by API"
            );
            return None;
        }

        Some(body)
    }
}
