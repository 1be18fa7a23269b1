// ABOUTME: SSH identity utilities for the snips client.
// ABOUTME: Re-exports key generation, persistence, parsing, and fingerprinting.

mod error;
mod fingerprint;
mod key;

pub use error::{Result, SshError};
pub use fingerprint::{fingerprint, public_key_openssh};
pub use key::{
    default_identity_path, load_key, load_or_generate_key, parse_private_key, save_key,
    xdg_config_dir, KeyGenerator, RsaKeyGenerator, DEFAULT_RSA_BITS,
};
