//! Line-oriented transport over byte streams.

use crate::error::Result;
use crate::protocol::codec;
use crate::protocol::types::STATUS_INTERNAL_ERROR;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{error, trace};

/// Transport trait for bridge communication.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Read one line-feed-terminated chunk, without the terminator.
    ///
    /// Returns `None` when the producer side has closed. An empty line is a
    /// valid (empty) chunk, not end-of-stream.
    async fn read_line(&self) -> Result<Option<Vec<u8>>>;

    /// Write one response line and flush it, so the response is observable
    /// before the next request is read.
    async fn write_line(&self, line: &[u8]) -> Result<()>;
}

/// Line transport over any pair of byte streams.
///
/// Reading buffers internally but consumes exactly one line-feed-terminated
/// chunk per call, blocking until one arrives or the stream ends.
pub struct LineTransport<R, W> {
    reader: Arc<Mutex<BufReader<R>>>,
    writer: Arc<Mutex<W>>,
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncRead + Send + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: Arc::new(Mutex::new(BufReader::new(reader))),
            writer: Arc::new(Mutex::new(writer)),
        }
    }
}

impl LineTransport<File, File> {
    /// Open the output path for writing, then the input path for reading.
    ///
    /// If the input fails to open, a 543 line describing the failure is
    /// written to the already-open output before the error is returned.
    /// When the output itself fails to open there is no handle to report
    /// on and the error is returned as-is.
    pub async fn open(input: &Path, output: &Path) -> Result<Self> {
        let mut out_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(output)
            .await?;

        let in_file = match File::open(input).await {
            Ok(file) => file,
            Err(e) => {
                error!("Failed to open input stream {}: {}", input.display(), e);
                let line = codec::serialize_response(
                    STATUS_INTERNAL_ERROR,
                    "",
                    Some(&format!("Unexpected file handling error {e}")),
                );
                if let Err(write_err) = out_file.write_all(&line).await {
                    error!("Failed to report setup failure: {}", write_err);
                }
                let _ = out_file.flush().await;
                return Err(e.into());
            }
        };

        Ok(Self::new(in_file, out_file))
    }
}

#[async_trait::async_trait]
impl<R, W> Transport for LineTransport<R, W>
where
    R: AsyncRead + Send + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    async fn read_line(&self) -> Result<Option<Vec<u8>>> {
        let mut reader = self.reader.lock().await;
        let mut line = Vec::new();

        let read = reader.read_until(b'\n', &mut line).await?;
        if read == 0 {
            return Ok(None); // EOF
        }
        if line.last() != Some(&b'\n') {
            // Partial line followed by EOF: the producer is gone.
            trace!(bytes = line.len(), "Discarding partial line at end of stream");
            return Ok(None);
        }
        line.pop();
        trace!(bytes = line.len(), "Received line");
        Ok(Some(line))
    }

    async fn write_line(&self, line: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line).await?;
        writer.flush().await?;
        Ok(())
    }
}
