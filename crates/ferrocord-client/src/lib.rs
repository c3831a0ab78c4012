//! # ferrocord-client
//!
//! Gateway session manager for the push protocol: connection lifecycle
//! state machine, heartbeat scheduling, sequence tracking, unbounded
//! fixed-delay reconnect, and the event/command dispatch layer.
//!
//! The stateless REST side of the protocol is consumed through two narrow
//! traits, [`EndpointResolver`] and [`MessageSender`], so the session core
//! never re-implements HTTP semantics.

pub mod client;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod heartbeat;
pub mod options;
pub mod resolver;
pub mod rest;
pub mod session;

pub use client::Client;
pub use commands::{CommandContext, CommandRouter};
pub use dispatch::{client_events, EventDispatcher};
pub use error::{ClientError, ResolverError};
pub use heartbeat::HeartbeatScheduler;
pub use options::ClientOptions;
pub use resolver::{EndpointResolver, RestEndpointResolver};
pub use rest::{Embed, MessageSender, OutboundMessage, RestSender};
pub use session::{Session, SessionShared, SessionState};

pub use ferrocord_protocol as protocol;
