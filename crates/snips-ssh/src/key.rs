// ABOUTME: SSH identity generation, loading, and persistence.
// ABOUTME: Produces 4096-bit RSA keys as PKCS#1 PEM and stores them with 0600 permissions.

use crate::error::{Result, SshError};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use russh::keys::PrivateKey;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Key size used when none is configured.
pub const DEFAULT_RSA_BITS: usize = 4096;

/// Source of fresh private keys, returned as PEM text.
///
/// The client only needs something that hands back key material; tests
/// substitute a fixed key so they never pay for prime search.
pub trait KeyGenerator: Send + Sync {
    /// Generate a new private key and return it PEM encoded.
    fn generate(&self) -> Result<String>;
}

/// Generates RSA key pairs encoded as PKCS#1 PEM (`BEGIN RSA PRIVATE KEY`).
#[derive(Debug, Clone, Copy)]
pub struct RsaKeyGenerator {
    bits: usize,
}

impl RsaKeyGenerator {
    /// Generator for [`DEFAULT_RSA_BITS`]-bit keys.
    pub fn new() -> Self {
        Self::with_bits(DEFAULT_RSA_BITS)
    }

    pub fn with_bits(bits: usize) -> Self {
        Self { bits }
    }

    pub fn bits(&self) -> usize {
        self.bits
    }
}

impl Default for RsaKeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyGenerator for RsaKeyGenerator {
    fn generate(&self) -> Result<String> {
        debug!(bits = self.bits, "Generating RSA key pair");

        let key = RsaPrivateKey::new(&mut rand::rngs::OsRng, self.bits).map_err(|source| {
            SshError::GenerateKey {
                bits: self.bits,
                source,
            }
        })?;

        let pem = key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| SshError::SerializeKey(e.to_string()))?;

        Ok(pem.to_string())
    }
}

/// Get XDG-style config directory (~/.config/snips).
///
/// Uses `XDG_CONFIG_HOME` if set, otherwise falls back to `~/.config`.
pub fn xdg_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("snips"))
}

/// Get the default identity path (~/.config/snips/id_rsa).
pub fn default_identity_path() -> Option<PathBuf> {
    xdg_config_dir().map(|p| p.join("id_rsa"))
}

/// Decode PEM key material into the key type used for authentication.
///
/// Accepts PKCS#1, PKCS#8, and OpenSSH encodings.
pub fn parse_private_key(pem: &str) -> Result<PrivateKey> {
    russh::keys::decode_secret_key(pem, None).map_err(SshError::ParseKey)
}

/// Load a private key from disk as PEM text.
///
/// The contents are parsed once so a corrupt file fails here rather than
/// halfway through an SSH handshake.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_key(key_path: &Path) -> Result<String> {
    let pem = std::fs::read_to_string(key_path).map_err(|e| SshError::ReadKey {
        path: key_path.to_path_buf(),
        source: e,
    })?;

    parse_private_key(&pem)?;
    Ok(pem)
}

/// Write PEM key material to disk.
///
/// Creates the parent directory if needed and sets Unix permissions to 0600.
pub fn save_key(key_path: &Path, pem: &str) -> Result<()> {
    if let Some(parent) = key_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SshError::CreateDirectory {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(key_path, pem.as_bytes()).map_err(|e| SshError::WriteKey {
        path: key_path.to_path_buf(),
        source: e,
    })?;

    // 0600 = rw-------
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(key_path, std::fs::Permissions::from_mode(0o600)).map_err(
            |e| SshError::SetPermissions {
                path: key_path.to_path_buf(),
                source: e,
            },
        )?;
    }

    Ok(())
}

/// Load an existing identity or generate and persist a new one.
///
/// # Errors
/// Returns an error if loading fails (for existing keys) or if generation
/// or writing fails.
pub fn load_or_generate_key(key_path: &Path, generator: &dyn KeyGenerator) -> Result<String> {
    if key_path.exists() {
        return load_key(key_path);
    }

    let pem = generator.generate()?;
    save_key(key_path, &pem)?;
    info!(path = %key_path.display(), "Generated new snips identity");
    Ok(pem)
}
