//! Gateway session state machine
//!
//! Owns the connection state, sequence counter and session identifier, and
//! interprets inbound frames into a list of [`Action`]s for the connection
//! driver to execute. Keeping the transitions free of socket I/O makes the
//! whole lifecycle testable without a network.

use ferrocord_protocol::{DispatchEvent, GatewayFrame, OpCode, User};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No socket; initial state and the state after every close
    Disconnected,
    /// Resolving the endpoint / opening the socket
    Connecting,
    /// Socket open, waiting for the server's Hello
    AwaitingHello,
    /// Hello received, Identify sent, waiting for the ready event
    Identifying,
    /// Handshake complete, session is live
    Connected,
    /// Post-close delay elapsed, about to re-enter Connecting
    Reconnecting,
}

/// Session state shared between the read loop and the heartbeat scheduler
///
/// These two paths are the only concurrent accessors, so plain mutexes
/// around the three fields are sufficient.
pub struct SessionShared {
    state: Mutex<SessionState>,
    sequence: Mutex<Option<u64>>,
    session_id: Mutex<Option<String>>,
}

impl SessionShared {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SessionState::Disconnected),
            sequence: Mutex::new(None),
            session_id: Mutex::new(None),
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn set_state(&self, state: SessionState) {
        *self.state.lock() = state;
    }

    /// Last sequence number received on the current socket
    pub fn sequence(&self) -> Option<u64> {
        *self.sequence.lock()
    }

    pub fn set_sequence(&self, sequence: Option<u64>) {
        *self.sequence.lock() = sequence;
    }

    /// Session identifier issued by the ready event
    pub fn session_id(&self) -> Option<String> {
        self.session_id.lock().clone()
    }

    pub fn set_session_id(&self, session_id: Option<String>) {
        *self.session_id.lock() = session_id;
    }

    /// Reset to the initial state; called on every disconnect
    ///
    /// A new socket starts with no sequence and no session identifier.
    pub fn reset(&self) {
        *self.state.lock() = SessionState::Disconnected;
        *self.sequence.lock() = None;
        *self.session_id.lock() = None;
    }
}

/// Side effect requested by a state transition
///
/// The connection driver executes these in order; the state machine itself
/// never touches the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Start the heartbeat scheduler at this interval
    StartHeartbeat(Duration),
    /// Send the Identify frame
    SendIdentify,
    /// Send an out-of-band heartbeat immediately
    SendHeartbeat,
    /// Notify listeners that the session is ready
    EmitReady(User),
    /// Fan a named event out to listeners
    EmitEvent { name: String, data: Value },
    /// Feed an inbound message to the command router
    DispatchCommand(ferrocord_protocol::MessageCreatePayload),
}

/// The gateway session state machine
pub struct Session {
    shared: Arc<SessionShared>,
}

impl Session {
    #[must_use]
    pub fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    /// Handle one inbound frame and return the side effects to execute
    ///
    /// Frames are processed one at a time in arrival order. Any frame
    /// carrying a sequence number overwrites the stored one; a regression
    /// is accepted (last write wins).
    pub fn handle_frame(&self, frame: &GatewayFrame) -> Vec<Action> {
        if let Some(s) = frame.s {
            self.shared.set_sequence(Some(s));
        }

        let mut actions = Vec::new();

        match frame.op {
            OpCode::Hello => {
                let Some(hello) = frame.as_hello() else {
                    tracing::trace!("Dropping Hello frame with malformed payload");
                    return actions;
                };

                self.shared.set_state(SessionState::Identifying);
                // Heartbeat starts before Identify is sent; the order is
                // part of the handshake contract.
                actions.push(Action::StartHeartbeat(Duration::from_millis(
                    hello.heartbeat_interval,
                )));
                actions.push(Action::SendIdentify);

                tracing::debug!(
                    heartbeat_interval_ms = hello.heartbeat_interval,
                    "Hello received, identifying"
                );
            }
            OpCode::HeartbeatAck => {
                // Informational only; absence of ACKs is not tracked.
                tracing::trace!(sequence = ?self.shared.sequence(), "Heartbeat acknowledged");
            }
            OpCode::Heartbeat => {
                // Server requested an immediate heartbeat, out of band with
                // the scheduled ticks.
                actions.push(Action::SendHeartbeat);
            }
            OpCode::Dispatch => {
                if let Some(name) = frame.event_name() {
                    self.handle_dispatch(name.to_string(), frame.d.as_ref(), &mut actions);
                }
            }
            OpCode::Identify => {
                tracing::trace!("Ignoring client-only opcode from server");
            }
        }

        actions
    }

    fn handle_dispatch(&self, name: String, data: Option<&Value>, actions: &mut Vec<Action>) {
        match DispatchEvent::decode(&name, data) {
            DispatchEvent::Ready(ready) => {
                self.shared.set_session_id(Some(ready.session_id.clone()));
                self.shared.set_state(SessionState::Connected);

                tracing::info!(
                    session_id = %ready.session_id,
                    user = %ready.user.tag(),
                    "Session ready"
                );

                actions.push(Action::EmitReady(ready.user));
            }
            DispatchEvent::MessageCreate(message) => {
                let raw = data.cloned().unwrap_or(Value::Null);
                actions.push(Action::EmitEvent {
                    name: crate::dispatch::client_events::MESSAGE_CREATE.to_string(),
                    data: raw,
                });
                actions.push(Action::DispatchCommand(message));
            }
            DispatchEvent::Other { name, data } => {
                // Unrecognized events are forwarded verbatim under their
                // wire name.
                actions.push(Action::EmitEvent { name, data });
            }
        }
    }
}
