//! Percent-encoded line codec.
//!
//! Every document crosses the wire as one percent-encoded JSON line
//! terminated by a single line-feed byte. Encoding a response can never
//! fail: when the normal serialization path breaks, a pre-rendered 543
//! line is emitted instead.

use crate::error::{ProtocolError, ProtocolResult};
use crate::protocol::types::Response;
use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Escape set for the wire encoding: everything except ASCII alphanumerics,
/// `-`, `_`, `.`, `~` and `/`.
const QUOTE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

const FALLBACK_JSON: &str = r#"{"response_body":"","http_response_code":543,"internal_error":true,"error_message":"can't even serialize what we're working with!"}"#;

/// Pre-rendered line used when serializing a response fails. Rendered once
/// and reused verbatim; this line itself can never fail to encode.
static FALLBACK_LINE: Lazy<Vec<u8>> = Lazy::new(|| encode_line(FALLBACK_JSON));

/// Percent-encode a string for the wire.
pub fn quote(text: &str) -> String {
    utf8_percent_encode(text, QUOTE_SET).to_string()
}

/// Reverse of [`quote`]. Fails on percent-sequences that do not decode to
/// valid UTF-8.
pub fn unquote(text: &str) -> Result<String, std::str::Utf8Error> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
}

/// The fixed fallback response line.
pub fn fallback_line() -> &'static [u8] {
    &FALLBACK_LINE
}

/// Encode one response as a percent-encoded, newline-terminated line.
pub fn encode(response: &Response) -> Vec<u8> {
    match serde_json::to_string(response) {
        Ok(json) => encode_line(&json),
        Err(_) => FALLBACK_LINE.clone(),
    }
}

/// Serialize a `(status, body, internal error)` triple into response bytes.
pub fn serialize_response(status: i64, body: &str, internal_error: Option<&str>) -> Vec<u8> {
    encode(&Response {
        response_body: body.to_string(),
        http_response_code: status,
        error_message: internal_error.map(str::to_string),
    })
}

/// Decode one raw line into a JSON value: UTF-8, percent-decode, JSON-decode.
/// Any step failing is a framing error naming the offending line.
pub fn decode_line(raw: &[u8]) -> ProtocolResult<serde_json::Value> {
    let text = std::str::from_utf8(raw).map_err(|e| framing_error(raw, e))?;
    let decoded = unquote(text.trim_end_matches(['\r', '\n'])).map_err(|e| framing_error(raw, e))?;
    serde_json::from_str(&decoded).map_err(|e| framing_error(raw, e))
}

fn encode_line(json: &str) -> Vec<u8> {
    let mut line = quote(json).into_bytes();
    line.push(b'\n');
    line
}

fn framing_error(raw: &[u8], reason: impl ToString) -> ProtocolError {
    ProtocolError::Framing {
        line: String::from_utf8_lossy(raw).into_owned(),
        reason: reason.to_string(),
    }
}
