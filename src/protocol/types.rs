//! Wire types for the line protocol.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status code for internal/framing errors: malformed line, malformed
/// request object, or loop-level fatal error.
pub const STATUS_INTERNAL_ERROR: i64 = 543;

/// Status code for an unregistered operation name.
pub const STATUS_NOT_FOUND: i64 = 404;

/// Status code for an operation that failed while executing.
pub const STATUS_OPERATION_FAILED: i64 = 500;

/// Body sent when the requested operation is not registered.
pub const NOT_FOUND_BODY: &str = "Function not found!";

/// Parsed query arguments: key to ordered sequence of values.
pub type QueryArgs = HashMap<String, Vec<String>>;

/// One request, decoded from a percent-encoded JSON line.
///
/// Constructed fresh per input line and discarded after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Operation key looked up in the registry.
    pub called_function: String,
    pub http_method: String,
    pub path: String,
    /// URL-query-encoded arguments; may be omitted on the wire.
    #[serde(default)]
    pub request_arguments: String,
    pub request_body: String,
}

impl Request {
    /// Decode `request_arguments` into a key/values map.
    pub fn query_args(&self) -> QueryArgs {
        parse_query(&self.request_arguments)
    }
}

/// One response, serialized as a percent-encoded JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub response_body: String,
    pub http_response_code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Response {
    pub fn new(status: i64, body: impl Into<String>) -> Self {
        Self {
            response_body: body.into(),
            http_response_code: status,
            error_message: None,
        }
    }

    /// Internal-error response: empty body plus an error message.
    pub fn internal(error: impl Into<String>) -> Self {
        Self {
            response_body: String::new(),
            http_response_code: STATUS_INTERNAL_ERROR,
            error_message: Some(error.into()),
        }
    }

    pub fn not_found() -> Self {
        Self::new(STATUS_NOT_FOUND, NOT_FOUND_BODY)
    }
}

impl From<&ProtocolError> for Response {
    fn from(err: &ProtocolError) -> Self {
        match err {
            ProtocolError::Framing { .. } | ProtocolError::Schema { .. } => {
                Self::internal(err.to_string())
            }
            ProtocolError::OperationNotFound(_) => Self::not_found(),
            // The failure description goes in the body, not error_message.
            ProtocolError::OperationFailed(_) => Self::new(err.status(), err.to_string()),
        }
    }
}

/// Decode a URL query string into key -> ordered values.
///
/// Repeated keys accumulate, `+` decodes to a space, and keys with blank
/// values are dropped.
pub fn parse_query(query: &str) -> QueryArgs {
    let mut args = QueryArgs::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        args.entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    args
}
