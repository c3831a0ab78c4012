//! Event dispatch
//!
//! Fans named events out to registered listeners in registration order,
//! synchronously and unbuffered. A panicking listener is isolated and
//! logged so the remaining listeners still run.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Client-facing event names
pub mod client_events {
    /// Handshake complete; payload is the user identity
    pub const READY: &str = "ready";
    /// Inbound message; payload is the raw message object
    pub const MESSAGE_CREATE: &str = "messageCreate";
}

type Listener = Box<dyn Fn(&Value) + Send + Sync>;

/// Listener table with ordered, isolated fan-out
pub struct EventDispatcher {
    listeners: RwLock<HashMap<String, Vec<Listener>>>,
}

impl EventDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Append a listener to the event's ordered list
    pub fn on(&self, event: &str, listener: impl Fn(&Value) + Send + Sync + 'static) {
        self.listeners
            .write()
            .entry(event.to_string())
            .or_default()
            .push(Box::new(listener));
    }

    /// Invoke every listener for the event, in registration order
    ///
    /// Emission is a direct synchronous call on the caller's context; there
    /// is no queue and no backpressure. The table is read-locked for the
    /// duration, so listeners must not register new listeners.
    pub fn emit(&self, event: &str, payload: &Value) {
        let listeners = self.listeners.read();
        let Some(registered) = listeners.get(event) else {
            return;
        };

        for listener in registered {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                tracing::warn!(
                    event = %event,
                    panic = panic_message(&panic),
                    "Event listener panicked"
                );
            }
        }
    }

    /// Number of listeners registered for an event
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
