//! Payload definitions
//!
//! Typed shapes carried in the `d` field of recognized frames.

use crate::intents::Intents;
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// First frame the server sends after the socket opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to authenticate the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot authentication token
    pub token: String,

    /// Capability bitmask controlling which event categories are delivered
    #[serde(with = "intents_bits")]
    pub intents: Intents,

    /// Static client properties
    pub properties: IdentifyProperties,
}

impl IdentifyPayload {
    /// Create an Identify payload with default client properties
    #[must_use]
    pub fn new(token: impl Into<String>, intents: Intents) -> Self {
        Self {
            token: token.into(),
            intents,
            properties: IdentifyProperties::default(),
        }
    }
}

/// Client connection properties sent in the Identify payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    pub os: String,

    /// Library name reported as the browser
    pub browser: String,

    /// Library name reported as the device
    pub device: String,
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "ferrocord".to_string(),
            device: "ferrocord".to_string(),
        }
    }
}

/// Payload of the `READY` dispatch event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyPayload {
    /// Opaque session identifier issued by the server
    pub session_id: String,

    /// Identity of the authenticated user
    pub user: User,
}

/// User identity as delivered in the `READY` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub discriminator: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl User {
    /// Full tag in `username#discriminator` form
    #[must_use]
    pub fn tag(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }
}

/// Payload of the `MESSAGE_CREATE` dispatch event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCreatePayload {
    /// Text content of the message
    #[serde(default)]
    pub content: String,

    /// Channel the message was posted in
    pub channel_id: String,

    /// Author identity, when the server includes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
}

/// Serialize intents as their raw bit value on the wire
mod intents_bits {
    use crate::intents::Intents;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(intents: &Intents, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(intents.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Intents, D::Error> {
        let bits = u64::deserialize(deserializer)?;
        Ok(Intents::from_bits_retain(bits))
    }
}
