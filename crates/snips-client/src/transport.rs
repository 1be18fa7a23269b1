// ABOUTME: Session transport abstraction consumed by the upload and sign paths.
// ABOUTME: Defines SessionTransport/Session traits, transcript buffering, and deadlines.

use crate::config::ConnectionConfig;
use crate::error::{Result, SnipsError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Opens authenticated sessions to the service.
///
/// Each call yields a fresh session; sessions are never shared between
/// uploads.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Connect and authenticate. Resolves only once the session is ready to
    /// run commands; any earlier termination is a [`SnipsError::Connection`].
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Session>>;
}

/// An authenticated session able to run remote commands.
#[async_trait]
pub trait Session: Send {
    /// Run `command_line` with `input` as its stdin and return everything
    /// it wrote to stdout, once the channel has closed.
    async fn exec(&mut self, command_line: &str, input: &[u8]) -> Result<Vec<u8>>;

    /// Tear the session down.
    async fn close(&mut self) -> Result<()>;
}

/// Output chunks collected in arrival order, joined only once the channel
/// reports closure.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    chunks: Vec<Vec<u8>>,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        if !chunk.is_empty() {
            self.chunks.push(chunk.to_vec());
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Concatenate every chunk; call after the channel has closed.
    pub fn finish(self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// Await `fut`, failing with [`SnipsError::Timeout`] if `deadline` elapses
/// first. No deadline means wait forever.
pub(crate) async fn with_deadline<T, F>(
    deadline: Option<Duration>,
    stage: &'static str,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(after) => tokio::time::timeout(after, fut)
            .await
            .map_err(|_| SnipsError::Timeout { stage, after })?,
        None => fut.await,
    }
}

/// Connect, run one command, and release the session.
///
/// The session is closed even when the command fails; the command's error
/// wins over a close error.
pub(crate) async fn run_once(
    transport: &dyn SessionTransport,
    config: &ConnectionConfig,
    command_line: &str,
    input: &[u8],
) -> Result<Vec<u8>> {
    let mut session = transport.connect(config).await?;
    debug!(command = command_line, bytes = input.len(), "Session ready");

    let output = session.exec(command_line, input).await;
    let closed = session.close().await;

    let output = match (output, closed) {
        (Ok(output), Ok(())) => output,
        (Ok(_), Err(e)) => return Err(e),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                debug!(error = %close_err, "Session close failed after exec error");
            }
            return Err(e);
        }
    };

    debug!(bytes = output.len(), "Command finished");
    Ok(output)
}
