//! Bridge server: owns the operation registry and drives the dispatch loop.

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::ops::{OperationHandler, OperationOutcome, OperationRegistry};
use crate::protocol::codec;
use crate::protocol::dispatcher::Dispatcher;
use crate::protocol::transport::{LineTransport, Transport};
use crate::protocol::types::{QueryArgs, Response};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info};

/// A request/response bridge between two byte streams.
///
/// Operations are registered before [`Bridge::run`] starts; the registry is
/// read-only for the duration of the loop. Exactly one request is in flight
/// at a time: the next line is not read until the previous response has been
/// written and flushed.
pub struct Bridge {
    config: BridgeConfig,
    registry: Arc<OperationRegistry>,
    requests: AtomicU64,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            registry: Arc::new(OperationRegistry::new()),
            requests: AtomicU64::new(0),
        }
    }

    /// Store `handler` under `name`, overwriting any prior handler.
    pub fn register_operation<H: OperationHandler + 'static>(
        &self,
        name: impl Into<String>,
        handler: H,
    ) {
        self.registry.register(name, handler);
    }

    /// Register a plain function or closure under `name`.
    pub fn register_fn<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&str, &str, &QueryArgs, &str) -> anyhow::Result<OperationOutcome>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register_fn(name, handler);
    }

    pub fn registry(&self) -> Arc<OperationRegistry> {
        Arc::clone(&self.registry)
    }

    /// Open the configured streams and run the dispatch loop until the
    /// producer closes the input.
    ///
    /// Per-request errors are reported on the output stream and never
    /// surface here; only stream-setup failure returns an error.
    pub async fn run(self) -> Result<()> {
        info!(
            input = %self.config.input.display(),
            output = %self.config.output.display(),
            "Opening bridge streams"
        );

        let transport = LineTransport::open(&self.config.input, &self.config.output).await?;
        self.run_with_transport(Arc::new(transport)).await
    }

    /// Run the dispatch loop over a custom transport.
    pub async fn run_with_transport<T: Transport + 'static>(self, transport: Arc<T>) -> Result<()> {
        info!(
            name = %self.config.name,
            version = %self.config.version,
            operations = self.registry.len(),
            "Bridge running"
        );

        let dispatcher = Dispatcher::new(Arc::clone(&self.registry));

        loop {
            let line = match transport.read_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("Producer closed the input stream, shutting down");
                    break;
                }
                Err(e) => {
                    error!("Transport read failed: {}", e);
                    let fallback = Response::internal(e.to_string());
                    if let Err(write_err) = transport.write_line(&codec::encode(&fallback)).await {
                        error!("Failed to send fallback response: {}", write_err);
                    }
                    break;
                }
            };

            let response = dispatcher.dispatch(&line).await;
            self.requests.fetch_add(1, Ordering::SeqCst);

            if let Err(e) = transport.write_line(&codec::encode(&response)).await {
                error!("Transport write failed: {}", e);
                let fallback = Response::internal(e.to_string());
                let _ = transport.write_line(&codec::encode(&fallback)).await;
                break;
            }
        }

        info!(
            requests = self.requests.load(Ordering::SeqCst),
            "Bridge stopped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::EchoOperation;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

    fn request_line(json: &str) -> Vec<u8> {
        let mut line = codec::quote(json).into_bytes();
        line.push(b'\n');
        line
    }

    fn echo_bridge() -> Bridge {
        let bridge = Bridge::new(BridgeConfig::new("/unused/in", "/unused/out"));
        bridge.register_operation("Echo", EchoOperation);
        bridge
    }

    async fn read_responses(response_rx: DuplexStream) -> Vec<serde_json::Value> {
        let mut reader = BufReader::new(response_rx);
        let mut responses = Vec::new();
        loop {
            let mut line = Vec::new();
            let read = reader.read_until(b'\n', &mut line).await.unwrap();
            if read == 0 {
                break;
            }
            responses.push(codec::decode_line(&line).unwrap());
        }
        responses
    }

    /// Feed raw bytes through a bridge and collect the decoded responses.
    async fn drive(bridge: Bridge, input: &[u8]) -> Vec<serde_json::Value> {
        let (mut request_tx, request_rx) = tokio::io::duplex(16 * 1024);
        let (response_tx, response_rx) = tokio::io::duplex(16 * 1024);

        request_tx.write_all(input).await.unwrap();
        drop(request_tx);

        let transport = LineTransport::new(request_rx, response_tx);
        bridge
            .run_with_transport(Arc::new(transport))
            .await
            .unwrap();

        read_responses(response_rx).await
    }

    #[tokio::test]
    async fn test_echo_end_to_end() {
        let input = request_line(
            r#"{"called_function":"Echo","http_method":"GET","path":"/x","request_arguments":"","request_body":"hi"}"#,
        );

        let responses = drive(echo_bridge(), &input).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["response_body"], "hi");
        assert_eq!(responses[0]["http_response_code"], 200);
        assert!(responses[0].get("error_message").is_none());
    }

    #[tokio::test]
    async fn test_one_response_per_line_in_order() {
        let mut input = request_line(
            r#"{"called_function":"Echo","http_method":"GET","path":"/x","request_arguments":"","request_body":"first"}"#,
        );
        input.extend(request_line(
            r#"{"called_function":"Missing","http_method":"GET","path":"/x","request_arguments":"","request_body":""}"#,
        ));
        input.extend(request_line(
            r#"{"called_function":"Echo","http_method":"GET","path":"/x","request_arguments":"","request_body":"second"}"#,
        ));

        let responses = drive(echo_bridge(), &input).await;
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["response_body"], "first");
        assert_eq!(responses[1]["http_response_code"], 404);
        assert_eq!(responses[1]["response_body"], "Function not found!");
        assert_eq!(responses[2]["response_body"], "second");
    }

    #[tokio::test]
    async fn test_malformed_line_keeps_loop_alive() {
        let mut input = b"not percent json\n".to_vec();
        input.extend(request_line(
            r#"{"called_function":"Echo","http_method":"GET","path":"/x","request_arguments":"","request_body":"still here"}"#,
        ));

        let responses = drive(echo_bridge(), &input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["http_response_code"], 543);
        assert!(
            !responses[0]["error_message"]
                .as_str()
                .unwrap()
                .is_empty()
        );
        assert_eq!(responses[1]["response_body"], "still here");
    }

    #[tokio::test]
    async fn test_eof_terminates_without_response() {
        let responses = drive(echo_bridge(), b"").await;
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn test_partial_line_is_not_dispatched() {
        let responses = drive(echo_bridge(), b"no terminator").await;
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn test_reregistration_replaces_handler() {
        let bridge = echo_bridge();
        bridge.register_fn(
            "Echo",
            |_method: &str, _path: &str, _args: &QueryArgs, _body: &str| {
                Ok((202, "replaced".to_string()))
            },
        );
        let input = request_line(
            r#"{"called_function":"Echo","http_method":"GET","path":"/x","request_arguments":"","request_body":"hi"}"#,
        );

        let responses = drive(bridge, &input).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["http_response_code"], 202);
        assert_eq!(responses[0]["response_body"], "replaced");
    }

    #[tokio::test]
    async fn test_file_backed_run() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("bridge.in");
        let output_path = dir.path().join("bridge.out");

        std::fs::write(
            &input_path,
            request_line(
                r#"{"called_function":"Echo","http_method":"GET","path":"/x","request_arguments":"","request_body":"via files"}"#,
            ),
        )
        .unwrap();

        let config = BridgeConfig::builder()
            .input(&input_path)
            .output(&output_path)
            .build()
            .unwrap();
        let bridge = Bridge::new(config);
        bridge.register_operation("Echo", EchoOperation);
        bridge.run().await.unwrap();

        let written = std::fs::read(&output_path).unwrap();
        let value = codec::decode_line(&written).unwrap();
        assert_eq!(value["response_body"], "via files");
        assert_eq!(value["http_response_code"], 200);
    }

    #[tokio::test]
    async fn test_setup_failure_escalates_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("missing.in");
        let output_path = dir.path().join("bridge.out");

        let bridge = Bridge::new(BridgeConfig::new(&input_path, &output_path));
        assert!(bridge.run().await.is_err());

        let written = std::fs::read(&output_path).unwrap();
        let value = codec::decode_line(&written).unwrap();
        assert_eq!(value["http_response_code"], 543);
    }
}
