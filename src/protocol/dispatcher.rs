//! Per-line dispatch state machine.
//!
//! Each raw input line moves through three stages: decode the line into a
//! JSON value, parse the value into a request record, then look up and
//! invoke the named operation. Every failure short-circuits into a response
//! with the matching status code; exactly one response comes out per line.

use crate::error::{ProtocolError, ProtocolResult};
use crate::ops::OperationRegistry;
use crate::protocol::codec;
use crate::protocol::types::{Request, Response};
use std::sync::Arc;
use tracing::{debug, warn};

/// Turns one raw input line into exactly one response.
pub struct Dispatcher {
    registry: Arc<OperationRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self { registry }
    }

    /// Run one line through decode, parse and invocation. Never fails:
    /// every error becomes a response carrying its status code.
    pub async fn dispatch(&self, raw: &[u8]) -> Response {
        match self.try_dispatch(raw).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed: {}", e);
                Response::from(&e)
            }
        }
    }

    async fn try_dispatch(&self, raw: &[u8]) -> ProtocolResult<Response> {
        let value = codec::decode_line(raw)?;

        // Formatting the value through Display cannot fail, so building the
        // schema error message cannot itself error out of the state machine.
        let request: Request = serde_json::from_value(value.clone()).map_err(|e| {
            ProtocolError::Schema {
                request: value.to_string(),
                reason: e.to_string(),
            }
        })?;

        debug!("Dispatching operation: {}", request.called_function);

        let handler = self
            .registry
            .get(&request.called_function)
            .ok_or_else(|| ProtocolError::OperationNotFound(request.called_function.clone()))?;

        let args = request.query_args();
        let (status, body) = handler
            .call(
                &request.http_method,
                &request.path,
                &args,
                &request.request_body,
            )
            .await
            .map_err(|e| ProtocolError::OperationFailed(e.to_string()))?;

        Ok(Response::new(status, body))
    }
}
