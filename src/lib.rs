//! # Service SDK - gRPC plugin host for evaluator services
//!
//! Exposes an in-process [`Service`] to a host process over gRPC:
//! - Generic tagged values and typed objects ([`value`])
//! - Forkable execution contexts with a shared type registry ([`context`])
//! - Value ↔ protobuf wire data codec ([`grpc::codec`])
//! - Per-call dispatch with classified error mapping ([`grpc::definition_service`])
//! - Plugin handshake and serve lifecycle ([`grpc::host`])
//! - Issue codes for reported errors ([`issue`])
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────────────────────────────┐
//!   host process  │  DefinitionServer                        │
//!   ──gRPC──────→ │   fork root Context → decode → Service   │
//!                 │   ← encode ← result / Status ←           │
//!                 └──────────────────────────────────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod context;
pub mod grpc;
pub mod issue;
pub mod proto;
pub mod service;
pub mod types;
pub mod value;

// Internal utilities
pub mod observability;

pub use context::Context;
pub use service::{Definition, Service, TypeSet, TypedName};
pub use types::{Config, Error, Result};
pub use value::{OrderedMap, Value};
