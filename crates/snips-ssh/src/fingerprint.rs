// ABOUTME: Public key derivation for snips identities.
// ABOUTME: Computes OpenSSH SHA256 fingerprints and authorized_keys lines from PEM keys.

use crate::error::{Result, SshError};
use crate::key::parse_private_key;
use russh::keys::HashAlg;

/// Compute the `SHA256:<base64>` fingerprint of the key's public half.
///
/// This is the same string `ssh-keygen -lf` prints, and what the service
/// shows for an account, so it is safe to log in place of the key itself.
pub fn fingerprint(pem: &str) -> Result<String> {
    let key = parse_private_key(pem)?;
    Ok(key.public_key().fingerprint(HashAlg::Sha256).to_string())
}

/// Render the key's public half as an OpenSSH `authorized_keys` line.
pub fn public_key_openssh(pem: &str) -> Result<String> {
    let key = parse_private_key(pem)?;
    key.public_key()
        .to_openssh()
        .map_err(|e| SshError::SerializeKey(e.to_string()))
}
