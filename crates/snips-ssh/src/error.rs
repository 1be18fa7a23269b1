// ABOUTME: Error types for SSH identity operations using thiserror.
// ABOUTME: Provides typed errors for key loading, generation, persistence, and parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during SSH identity operations.
#[derive(Error, Debug)]
pub enum SshError {
    /// Failed to read a key file from disk.
    #[error("failed to read SSH key from {path}: {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse PEM key material.
    #[error("failed to parse SSH private key: {0}")]
    ParseKey(#[source] russh::keys::Error),

    /// Failed to generate an RSA key pair.
    #[error("failed to generate RSA key ({bits} bits): {source}")]
    GenerateKey {
        bits: usize,
        #[source]
        source: rsa::Error,
    },

    /// Failed to encode a key as PEM.
    #[error("failed to serialize key: {0}")]
    SerializeKey(String),

    /// Failed to write a key file to disk.
    #[error("failed to write key to {path}: {source}")]
    WriteKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to set file permissions.
    #[error("failed to set permissions on {path}: {source}")]
    SetPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using SshError.
pub type Result<T> = std::result::Result<T, SshError>;
