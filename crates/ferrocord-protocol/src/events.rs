//! Dispatch events
//!
//! The `d` payload of an op 0 frame varies by event name. The closed set of
//! recognized events is modeled as a tagged union with a raw-value fallback
//! for everything else.

use crate::payloads::{MessageCreatePayload, ReadyPayload};
use serde_json::Value;

/// Event name constants for the recognized dispatch events
pub mod event_names {
    /// Session ready - handshake complete, carries session id and user
    pub const READY: &str = "READY";
    /// A message was posted to a subscribed channel
    pub const MESSAGE_CREATE: &str = "MESSAGE_CREATE";
}

/// A dispatch event decoded from an op 0 frame
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// Handshake complete
    Ready(ReadyPayload),
    /// Inbound message
    MessageCreate(MessageCreatePayload),
    /// Unrecognized event, raw payload retained for forward compatibility
    Other { name: String, data: Value },
}

impl DispatchEvent {
    /// Decode an event from its name and raw payload
    ///
    /// A recognized name whose payload does not deserialize falls back to
    /// `Other`, so callers never lose the raw data.
    #[must_use]
    pub fn decode(name: &str, data: Option<&Value>) -> Self {
        let raw = data.cloned().unwrap_or(Value::Null);

        match name {
            event_names::READY => match serde_json::from_value(raw.clone()) {
                Ok(ready) => Self::Ready(ready),
                Err(_) => Self::Other { name: name.to_string(), data: raw },
            },
            event_names::MESSAGE_CREATE => match serde_json::from_value(raw.clone()) {
                Ok(message) => Self::MessageCreate(message),
                Err(_) => Self::Other { name: name.to_string(), data: raw },
            },
            _ => Self::Other { name: name.to_string(), data: raw },
        }
    }

    /// Name of the event as it appeared on the wire
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Ready(_) => event_names::READY,
            Self::MessageCreate(_) => event_names::MESSAGE_CREATE,
            Self::Other { name, .. } => name,
        }
    }
}
