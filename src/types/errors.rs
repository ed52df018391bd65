//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Classified
//! failures (reported issues, argument shape, wire decoding) are converted to
//! structured gRPC statuses at the dispatcher boundary; panics are never
//! converted and abort the call instead.

use crate::grpc::codec::DecodeError;
use crate::issue::Reported;
use thiserror::Error;
use tonic::metadata::{MetadataMap, MetadataValue};
use tonic::Code;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Metadata key carrying the classified error code on failed calls.
pub const ISSUE_CODE_METADATA_KEY: &str = "x-issue-code";

/// Code reported for [`Error::InvalidArgumentShape`].
pub const INVALID_ARGUMENT_SHAPE: &str = "INVALID_ARGUMENT_SHAPE";

/// Code reported for [`Error::Decode`].
pub const DECODE_ERROR: &str = "DECODE_ERROR";

/// Main error enum for the service host.
#[derive(Error, Debug)]
pub enum Error {
    /// Issue reported by service logic (map to gRPC FAILED_PRECONDITION).
    #[error("{0}")]
    Issue(#[from] Reported),

    /// Decoded argument has the wrong shape (map to gRPC INVALID_ARGUMENT).
    #[error("{operation} expects {expected} but got {actual}")]
    InvalidArgumentShape {
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// Malformed wire data (map to gRPC INVALID_ARGUMENT).
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Plugin handshake failure. Fatal at startup.
    #[error("handshake error: {0}")]
    Handshake(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// gRPC transport errors.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classified error code, if this error carries one.
    pub fn issue_code(&self) -> Option<&'static str> {
        match self {
            Error::Issue(reported) => Some(reported.code()),
            Error::InvalidArgumentShape { .. } => Some(INVALID_ARGUMENT_SHAPE),
            Error::Decode(_) => Some(DECODE_ERROR),
            _ => None,
        }
    }

    /// Convert to gRPC status code.
    pub fn to_grpc_status(&self) -> tonic::Status {
        match self {
            Error::Issue(reported) => {
                let details = serde_json::json!({
                    "code": reported.code(),
                    "args": reported.args(),
                });
                let details = serde_json::to_vec(&details).unwrap_or_default();
                tonic::Status::with_details_and_metadata(
                    Code::FailedPrecondition,
                    reported.message(),
                    bytes::Bytes::from(details),
                    issue_metadata(reported.code()),
                )
            }
            Error::InvalidArgumentShape { .. } | Error::Decode(_) => {
                tonic::Status::with_metadata(
                    Code::InvalidArgument,
                    self.to_string(),
                    issue_metadata(self.issue_code().unwrap_or_default()),
                )
            }
            Error::Handshake(msg) => tonic::Status::failed_precondition(msg),
            Error::Config(msg) => tonic::Status::failed_precondition(msg),
            Error::Transport(e) => tonic::Status::unavailable(format!("transport error: {}", e)),
            Error::Io(e) => tonic::Status::internal(format!("io error: {}", e)),
        }
    }
}

fn issue_metadata(code: &'static str) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    metadata.insert(ISSUE_CODE_METADATA_KEY, MetadataValue::from_static(code));
    metadata
}

// Convenience constructors
impl Error {
    pub fn invalid_argument_shape(
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        Self::InvalidArgumentShape {
            operation,
            expected,
            actual,
        }
    }

    pub fn handshake(msg: impl Into<String>) -> Self {
        Self::Handshake(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

// Implement From<Error> for Status to enable ? operator in gRPC handlers
impl From<Error> for tonic::Status {
    fn from(err: Error) -> Self {
        err.to_grpc_status()
    }
}
