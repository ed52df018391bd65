//! gRPC transport layer.
//!
//! - [`codec`] - Value ↔ wire data conversion
//! - [`definition_service`] - Per-call dispatch onto the wrapped service
//! - [`controller`] - Host-initiated shutdown
//! - [`handshake`] / [`host`] - Plugin handshake and serve lifecycle

pub mod codec;
pub mod controller;
pub mod definition_service;
pub mod handshake;
pub mod host;

pub use codec::{decode, encode, DecodeError};
pub use controller::Controller;
pub use definition_service::DefinitionServer;
pub use handshake::HandshakeLine;
pub use host::{serve, serve_with_env, ServiceHost};
