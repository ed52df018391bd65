//! Core types for the service host.
//!
//! This module provides foundational types used throughout the crate:
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Server, handshake and observability configuration

mod config;
mod errors;

pub use config::{
    Config, HandshakeConfig, ObservabilityConfig, ServerConfig, ENV_BIND_HOST, ENV_LOG_FORMAT,
    ENV_MAX_PORT, ENV_MIN_PORT, ENV_PROTOCOL_VERSIONS,
};
pub use errors::{Error, Result, DECODE_ERROR, INVALID_ARGUMENT_SHAPE, ISSUE_CODE_METADATA_KEY};
