//! Operation handlers and registry.

pub mod echo;

pub use echo::EchoOperation;

use crate::protocol::types::QueryArgs;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Outcome of a successful operation: status code and body.
pub type OperationOutcome = (i64, String);

/// Handler bound to an operation name.
///
/// Receives the request's method, path, decoded query arguments and body.
/// An `Err` is reported to the requester as a 500 response; it never
/// propagates past the dispatch loop.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    async fn call(
        &self,
        method: &str,
        path: &str,
        args: &QueryArgs,
        body: &str,
    ) -> anyhow::Result<OperationOutcome>;
}

/// Adapter turning a plain function into an [`OperationHandler`].
pub struct FnOperation<F>(pub F);

#[async_trait]
impl<F> OperationHandler for FnOperation<F>
where
    F: Fn(&str, &str, &QueryArgs, &str) -> anyhow::Result<OperationOutcome> + Send + Sync,
{
    async fn call(
        &self,
        method: &str,
        path: &str,
        args: &QueryArgs,
        body: &str,
    ) -> anyhow::Result<OperationOutcome> {
        (self.0)(method, path, args, body)
    }
}

/// Registry mapping operation names to handlers.
///
/// Populated before the dispatch loop starts and treated as read-only while
/// it runs. Multiple independent bridges each own their own registry.
pub struct OperationRegistry {
    operations: DashMap<String, Arc<dyn OperationHandler>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            operations: DashMap::new(),
        }
    }

    /// Register `handler` under `name`, replacing any prior handler.
    pub fn register<H: OperationHandler + 'static>(&self, name: impl Into<String>, handler: H) {
        let name = name.into();
        debug!("Registering operation: {}", name);
        self.operations.insert(name, Arc::new(handler));
    }

    /// Register a plain function or closure under `name`.
    pub fn register_fn<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&str, &str, &QueryArgs, &str) -> anyhow::Result<OperationOutcome>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, FnOperation(handler));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OperationHandler>> {
        self.operations.get(name).map(|r| Arc::clone(&*r))
    }

    pub fn names(&self) -> Vec<String> {
        self.operations.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
