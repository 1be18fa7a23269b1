// ABOUTME: SnipsClient, the upload orchestrator.
// ABOUTME: Provisions an identity, runs the upload over SSH, then sanitizes, parses, and validates.

use crate::command::UploadCommand;
use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::parse::ParsedFields;
use crate::provision::KeyProvisioner;
use crate::sanitize::sanitize;
use crate::sign;
use crate::snip::{Snip, UploadOptions};
use crate::ssh::RusshTransport;
use crate::transport::{run_once, SessionTransport};
use snips_ssh::{KeyGenerator, RsaKeyGenerator};
use std::sync::Arc;
use tracing::{debug, info};

/// Client for uploading to snips.sh.
///
/// Uploads from one client share its identity; each upload opens and
/// closes its own session.
///
/// # Example
///
/// ```ignore
/// use snips_client::{ConnectionConfig, SnipsClient, UploadOptions};
///
/// let client = SnipsClient::new(ConnectionConfig::default());
/// let snip = client.upload("Hello!", UploadOptions::default()).await?;
/// println!("{}", snip.url.unwrap_or_default());
/// ```
pub struct SnipsClient {
    provisioner: KeyProvisioner,
    transport: Arc<dyn SessionTransport>,
}

impl SnipsClient {
    /// Client using SSH and, when `config` has no key, a generated
    /// 4096-bit RSA identity.
    pub fn new(config: ConnectionConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(RusshTransport::new()),
            Arc::new(RsaKeyGenerator::new()),
        )
    }

    /// Client with an explicit transport and key generator.
    pub fn with_parts(
        config: ConnectionConfig,
        transport: Arc<dyn SessionTransport>,
        generator: Arc<dyn KeyGenerator>,
    ) -> Self {
        Self {
            provisioner: KeyProvisioner::new(config, generator),
            transport,
        }
    }

    /// The config sessions authenticate with, generating a key if needed.
    ///
    /// Generated keys live only in memory; persist `private_key` from the
    /// returned config to reuse the identity later.
    pub async fn identity(&self) -> Result<Arc<ConnectionConfig>> {
        self.provisioner.ensure_identity().await
    }

    /// Upload `content` and return the validated snip.
    #[tracing::instrument(skip_all, fields(bytes = content.as_ref().len(), private = options.private))]
    pub async fn upload(&self, content: impl AsRef<[u8]>, options: UploadOptions) -> Result<Snip> {
        let config = self.provisioner.ensure_identity().await?;
        let command = UploadCommand::new(content.as_ref(), options);

        let raw = run_once(
            self.transport.as_ref(),
            &config,
            &command.command_line(),
            command.payload,
        )
        .await?;

        let transcript = sanitize(&String::from_utf8_lossy(&raw));
        let fields = ParsedFields::extract(&transcript);
        debug!(?fields, "Parsed upload response");

        let snip = Snip::from_fields(fields, config, Arc::clone(&self.transport))?;
        info!(id = %snip.id, visibility = %snip.visibility, "Uploaded snip");
        Ok(snip)
    }

    /// Request a signed link for snip `id` using this client's identity.
    pub async fn sign(&self, id: &str) -> Result<String> {
        let config = self.provisioner.ensure_identity().await?;
        sign::sign(self.transport.as_ref(), &config, id).await
    }
}
