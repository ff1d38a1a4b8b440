//! Echo operation: returns the request body unchanged.

use crate::ops::{OperationHandler, OperationOutcome};
use crate::protocol::types::QueryArgs;
use async_trait::async_trait;
use tracing::debug;

pub struct EchoOperation;

#[async_trait]
impl OperationHandler for EchoOperation {
    async fn call(
        &self,
        method: &str,
        path: &str,
        args: &QueryArgs,
        body: &str,
    ) -> anyhow::Result<OperationOutcome> {
        debug!(%method, %path, args = args.len(), "Echoing request body");
        Ok((200, body.to_string()))
    }
}
