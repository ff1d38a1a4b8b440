//! Bridge binary entry point.

use anyhow::{Context, Result};
use fifo_bridge::config::BridgeConfig;
use fifo_bridge::ops::EchoOperation;
use fifo_bridge::server::Bridge;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const USAGE: &str = "Usage: fifo-bridge <input-path> <output-path>";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let input = args.next().context(USAGE)?;
    let output = args.next().context(USAGE)?;

    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = BridgeConfig::builder().input(&input).output(&output).build()?;
    let bridge = Bridge::new(config);
    bridge.register_operation("Echo", EchoOperation);

    info!(%input, %output, "Bridge ready, waiting for requests...");

    bridge.run().await?;

    info!("Bridge shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fifo_bridge=info,warn"));

    // JSON logs go to stderr; the wire protocol owns the data streams.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .json()
        .init();
}
