//! Client configuration

use ferrocord_protocol::{IdentifyProperties, Intents};
use std::time::Duration;

/// Default REST API base
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Configuration for a [`crate::Client`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Command prefix extracted from inbound message content
    pub prefix: String,
    /// Capability bitmask sent in the Identify frame
    pub intents: Intents,
    /// Fixed delay before every reconnect attempt.
    ///
    /// Applied uniformly regardless of failure cause; retries are
    /// unbounded. No backoff, no jitter.
    pub reconnect_delay: Duration,
    /// Base URL of the REST API
    pub api_base: String,
    /// Static client properties sent in the Identify frame
    pub properties: IdentifyProperties,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            intents: Intents::default(),
            reconnect_delay: Duration::from_millis(5000),
            api_base: DEFAULT_API_BASE.to_string(),
            properties: IdentifyProperties::default(),
        }
    }
}

impl ClientOptions {
    /// Set the command prefix
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the intents bitmask
    #[must_use]
    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = intents;
        self
    }

    /// Set the fixed reconnect delay
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Set the REST API base URL
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}
