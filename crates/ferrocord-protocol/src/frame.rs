//! Gateway frame format
//!
//! Every message on the socket, in either direction, is one JSON object
//! with this shape.

use crate::opcodes::OpCode;
use crate::payloads::{HelloPayload, IdentifyPayload};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway frame
///
/// `s` and `t` are only populated on op 0 (Dispatch) frames from the
/// server; `d` varies by opcode and event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayFrame {
    /// Operation code
    pub op: OpCode,

    /// Event name (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Opcode/event-specific payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayFrame {
    // === Client frames ===

    /// Create an Identify frame (op=2)
    #[must_use]
    pub fn identify(payload: &IdentifyPayload) -> Self {
        Self {
            op: OpCode::Identify,
            t: None,
            s: None,
            d: serde_json::to_value(payload).ok(),
        }
    }

    /// Create a Heartbeat frame (op=1) carrying the last known sequence
    ///
    /// `d` is an explicit JSON null when no sequence has been received yet.
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            op: OpCode::Heartbeat,
            t: None,
            s: None,
            d: Some(last_sequence.map_or(Value::Null, |s| Value::Number(s.into()))),
        }
    }

    // === Parsing server frames ===

    /// Try to parse as a Hello payload (op=10)
    #[must_use]
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.d.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Event name if this is a Dispatch frame
    #[must_use]
    pub fn event_name(&self) -> Option<&str> {
        if self.op == OpCode::Dispatch {
            self.t.as_deref()
        } else {
            None
        }
    }

    // === Utilities ===

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "GatewayFrame(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "GatewayFrame(op={})", self.op)
        }
    }
}
