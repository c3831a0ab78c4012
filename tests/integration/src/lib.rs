//! Integration test utilities for the gateway client
//!
//! Provides an in-process mock gateway server and in-memory REST
//! collaborators so end-to-end tests can drive the client over a real
//! WebSocket without a network.

pub mod gateway;

pub use gateway::*;
