//! Request/response bridge over newline-delimited, percent-encoded JSON.
//!
//! Reads requests from one byte stream, dispatches each to a registered
//! operation handler, and writes exactly one response line per request to a
//! second byte stream. The streams are typically named pipes, letting an
//! external process drive application logic through a narrow textual
//! protocol instead of a native call interface.
//!
//! # Example
//!
//! ```no_run
//! use fifo_bridge::{config::BridgeConfig, ops::EchoOperation, server::Bridge};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BridgeConfig::builder()
//!         .input("/tmp/bridge.in")
//!         .output("/tmp/bridge.out")
//!         .build()?;
//!
//!     let bridge = Bridge::new(config);
//!     bridge.register_operation("Echo", EchoOperation);
//!
//!     // Blocks until the producer closes the input stream.
//!     bridge.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod ops;
pub mod protocol;
pub mod server;

pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use error::{BridgeError, ConfigError, ProtocolError, Result};
pub use ops::{OperationHandler, OperationOutcome, OperationRegistry};
pub use protocol::{LineTransport, QueryArgs, Request, Response, Transport};
pub use server::Bridge;
