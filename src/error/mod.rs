//! Error types for the bridge.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` conversions.

use std::borrow::Cow;
use thiserror::Error;

/// Main error type for the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: Cow<'static, str> },
}

/// Per-request protocol errors.
///
/// Each variant maps to the wire status code reported to the requester;
/// none of them escapes the dispatch loop.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The raw line could not be recovered into a JSON document
    /// (invalid UTF-8, percent-encoding or JSON).
    #[error("Invalid line {line}: {reason}")]
    Framing { line: String, reason: String },

    /// The decoded JSON lacks a required request field.
    #[error("Invalid request {request}: {reason}")]
    Schema { request: String, reason: String },

    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl ProtocolError {
    /// Returns the wire status code for this error.
    pub fn status(&self) -> i64 {
        match self {
            Self::Framing { .. } | Self::Schema { .. } => {
                crate::protocol::types::STATUS_INTERNAL_ERROR
            }
            Self::OperationNotFound(_) => crate::protocol::types::STATUS_NOT_FOUND,
            Self::OperationFailed(_) => crate::protocol::types::STATUS_OPERATION_FAILED,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(Cow<'static, str>),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: Cow<'static, str>,
        message: Cow<'static, str>,
    },
}

/// Result type alias for BridgeError.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Result type alias for ProtocolError.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_status() {
        let framing = ProtocolError::Framing {
            line: "garbage".into(),
            reason: "not json".into(),
        };
        assert_eq!(framing.status(), 543);

        let schema = ProtocolError::Schema {
            request: "{}".into(),
            reason: "missing field".into(),
        };
        assert_eq!(schema.status(), 543);

        assert_eq!(ProtocolError::OperationNotFound("Echo".into()).status(), 404);
        assert_eq!(ProtocolError::OperationFailed("boom".into()).status(), 500);
    }

    #[test]
    fn test_error_conversion() {
        let protocol_error = ProtocolError::OperationFailed("boom".into());
        let bridge_error: BridgeError = protocol_error.into();
        assert!(matches!(bridge_error, BridgeError::Protocol(_)));
    }

    #[test]
    fn test_framing_message_names_line() {
        let err = ProtocolError::Framing {
            line: "%7Bnope".into(),
            reason: "expected value".into(),
        };
        let message = err.to_string();
        assert!(message.contains("%7Bnope"));
        assert!(message.contains("expected value"));
    }
}
