//! Command routing
//!
//! Parses the configured prefix out of inbound message content, resolves a
//! registered handler and invokes it on its own task with a bound
//! reply/embed context. A slow or failing handler never delays frame
//! intake or heartbeats.

use crate::rest::{Embed, MessageSender, OutboundMessage};
use dashmap::DashMap;
use ferrocord_protocol::MessageCreatePayload;
use futures_util::future::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;

type CommandHandler = Arc<dyn Fn(CommandContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Context passed to a command handler
pub struct CommandContext {
    /// The original message payload
    pub message: MessageCreatePayload,
    /// Tokens following the command key
    pub args: Vec<String>,
    sender: Arc<dyn MessageSender>,
}

impl CommandContext {
    /// Post plain text back to the originating channel
    ///
    /// Empty text is a no-op.
    pub async fn reply(&self, text: impl Into<String>) -> Option<Value> {
        let text = text.into();
        if text.is_empty() {
            return None;
        }
        self.sender
            .send(&self.message.channel_id, OutboundMessage::Text(text))
            .await
    }

    /// Post a rich-content payload back to the originating channel
    pub async fn embed(&self, embed: Embed) -> Option<Value> {
        self.sender
            .send(&self.message.channel_id, OutboundMessage::Embed(embed))
            .await
    }
}

/// Maps command keys to handlers and routes inbound messages to them
pub struct CommandRouter {
    prefix: String,
    commands: DashMap<String, CommandHandler>,
}

impl CommandRouter {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            commands: DashMap::new(),
        }
    }

    /// Register a handler under a key; a later registration for the same
    /// key overwrites the earlier one
    ///
    /// Keys are case-insensitive and may include the prefix
    /// (`"!ping"` and `"ping"` are distinct registrations).
    pub fn register<F, Fut>(&self, name: &str, handler: F)
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handler: CommandHandler = Arc::new(move |ctx| Box::pin(handler(ctx)));
        self.commands.insert(name.to_lowercase(), handler);
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no commands are registered
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Route an inbound message to its handler, if any
    ///
    /// Non-command content (no prefix, unknown key) is a no-op. The handler
    /// runs on an independent task; its errors and panics are contained
    /// there. Returns the task handle when a handler was invoked.
    pub fn dispatch(
        &self,
        message: MessageCreatePayload,
        sender: Arc<dyn MessageSender>,
    ) -> Option<JoinHandle<()>> {
        let content = message.content.trim();
        let rest = content.strip_prefix(self.prefix.as_str())?;

        let mut tokens = rest.split_whitespace();
        let key = tokens.next()?.to_lowercase();
        let args: Vec<String> = tokens.map(str::to_string).collect();

        // Prefix-inclusive registrations win over bare ones. The first
        // guard is released before the second lookup.
        let prefixed = self
            .commands
            .get(&format!("{}{key}", self.prefix))
            .map(|entry| entry.value().clone());
        let handler = match prefixed {
            Some(handler) => handler,
            None => self.commands.get(&key).map(|entry| entry.value().clone())?,
        };

        tracing::debug!(command = %key, args = args.len(), "Dispatching command");

        let ctx = CommandContext { message, args, sender };

        Some(tokio::spawn(async move {
            if let Err(e) = handler(ctx).await {
                tracing::warn!(error = %e, "Command handler failed");
            }
        }))
    }
}
