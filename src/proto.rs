//! Generated protobuf and gRPC types.

#![allow(missing_docs, clippy::all, missing_debug_implementations)]

/// Structural wire data.
pub mod datapb {
    tonic::include_proto!("datapb");
}

/// `DefinitionService` envelopes, server and client.
pub mod servicepb {
    tonic::include_proto!("servicepb");
}

/// Plugin controller service.
pub mod plugin {
    tonic::include_proto!("plugin");
}
