// ABOUTME: SessionTransport implementation on top of russh.
// ABOUTME: Public-key auth, optional host key pinning, exec channels drained until close.

use crate::config::ConnectionConfig;
use crate::error::{Result, SnipsError};
use crate::transport::{with_deadline, Session, SessionTransport, TranscriptBuffer};
use async_trait::async_trait;
use russh::client;
use russh::keys::{HashAlg, PrivateKeyWithHashAlg, PublicKey};
use russh::{ChannelMsg, Disconnect};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Transport that speaks SSH to the real service.
#[derive(Debug, Clone, Default)]
pub struct RusshTransport {
    ssh_config: Arc<client::Config>,
}

impl RusshTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Accepts the server key, or checks it against a pinned fingerprint.
struct ClientHandler {
    host: String,
    expected_fingerprint: Option<String>,
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint(HashAlg::Sha256).to_string();
        match &self.expected_fingerprint {
            Some(expected) if *expected != fingerprint => {
                warn!(
                    host = %self.host,
                    expected = %expected,
                    actual = %fingerprint,
                    "Server host key does not match pinned fingerprint"
                );
                Ok(false)
            }
            _ => {
                debug!(host = %self.host, fingerprint = %fingerprint, "Accepted server host key");
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl SessionTransport for RusshTransport {
    #[tracing::instrument(skip_all, fields(host = %config.host, port = config.port, user = %config.username))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn Session>> {
        let pem = config
            .private_key
            .as_deref()
            .ok_or_else(|| SnipsError::Connection("no private key configured".to_string()))?;
        let key = Arc::new(snips_ssh::parse_private_key(pem)?);

        let handler = ClientHandler {
            host: config.host.clone(),
            expected_fingerprint: config.host_fingerprint.clone(),
        };

        let handshake = async {
            let mut handle = client::connect(
                Arc::clone(&self.ssh_config),
                (config.host.as_str(), config.port),
                handler,
            )
            .await?;

            let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
            let auth = handle
                .authenticate_publickey(
                    config.username.clone(),
                    PrivateKeyWithHashAlg::new(key, hash_alg),
                )
                .await?;

            if !auth.success() {
                return Err(SnipsError::Connection(format!(
                    "server rejected public key for user {:?}",
                    config.username
                )));
            }

            Ok(handle)
        };

        let handle = with_deadline(config.timeout, "connect", handshake).await?;
        debug!("Session authenticated");

        Ok(Box::new(RusshSession {
            handle,
            timeout: config.timeout,
        }))
    }
}

struct RusshSession {
    handle: client::Handle<ClientHandler>,
    timeout: Option<Duration>,
}

#[async_trait]
impl Session for RusshSession {
    async fn exec(&mut self, command_line: &str, input: &[u8]) -> Result<Vec<u8>> {
        let timeout = self.timeout;
        with_deadline(
            timeout,
            "exec",
            run_command(&mut self.handle, command_line, input),
        )
        .await
    }

    async fn close(&mut self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await?;
        Ok(())
    }
}

async fn run_command(
    handle: &mut client::Handle<ClientHandler>,
    command_line: &str,
    input: &[u8],
) -> Result<Vec<u8>> {
    let mut channel = handle
        .channel_open_session()
        .await
        .map_err(|e| SnipsError::Channel(format!("remote refused to open a channel: {e}")))?;

    channel
        .exec(true, command_line)
        .await
        .map_err(|e| SnipsError::Channel(format!("failed to request exec: {e}")))?;

    if !input.is_empty() {
        channel
            .data(input)
            .await
            .map_err(|e| SnipsError::Channel(format!("failed to send input: {e}")))?;
    }
    channel
        .eof()
        .await
        .map_err(|e| SnipsError::Channel(format!("failed to close input: {e}")))?;

    let mut transcript = TranscriptBuffer::new();
    let mut closed = false;
    while let Some(msg) = channel.wait().await {
        match msg {
            ChannelMsg::Data { ref data } => transcript.push(data),
            ChannelMsg::ExtendedData { ref data, ext } => {
                debug!(ext, bytes = data.len(), "Ignoring extended channel data");
            }
            ChannelMsg::Failure => {
                return Err(SnipsError::Channel(format!(
                    "remote refused to run {command_line:?}"
                )));
            }
            ChannelMsg::ExitStatus { exit_status } => {
                debug!(exit_status, "Remote command exited");
            }
            ChannelMsg::Close => {
                closed = true;
                break;
            }
            _ => {}
        }
    }

    // The message stream also ends when the connection drops; what arrived
    // by then is not a whole transcript.
    if !closed {
        return Err(SnipsError::Connection(format!(
            "session ended before the channel closed ({} chunks received)",
            transcript.chunk_count()
        )));
    }

    debug!(chunks = transcript.chunk_count(), "Channel closed");
    Ok(transcript.finish())
}
