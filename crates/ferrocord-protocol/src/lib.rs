//! # ferrocord-protocol
//!
//! Wire format for the gateway: operation codes, the `{op, s, t, d}` frame,
//! typed payloads for the recognized opcodes and dispatch events, and the
//! intents capability bitmask.

pub mod events;
pub mod frame;
pub mod intents;
pub mod opcodes;
pub mod payloads;

pub use events::{event_names, DispatchEvent};
pub use frame::GatewayFrame;
pub use intents::Intents;
pub use opcodes::OpCode;
pub use payloads::{
    HelloPayload, IdentifyPayload, IdentifyProperties, MessageCreatePayload, ReadyPayload, User,
};
