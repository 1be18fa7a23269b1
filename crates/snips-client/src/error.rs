// ABOUTME: Error types for the snips upload client.
// ABOUTME: Covers connection, channel, validation, and visibility/url invariant failures.

use crate::snip::Visibility;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while uploading or signing a snip.
#[derive(Error, Debug)]
pub enum SnipsError {
    /// TCP connect, handshake, or authentication failed, or the remote
    /// ended the session before it became usable.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The remote refused to open the exec channel or run the command.
    #[error("channel error: {0}")]
    Channel(String),

    /// A required field is missing or malformed in the upload response.
    #[error("invalid upload response: {field} {detail}")]
    Validation { field: &'static str, detail: String },

    /// The response's visibility disagrees with the presence of a url.
    #[error("{}", invariant_message(.visibility, .url_present))]
    Invariant {
        visibility: Visibility,
        url_present: bool,
    },

    /// The configured deadline expired.
    #[error("{stage} timed out after {after:?}")]
    Timeout {
        stage: &'static str,
        after: Duration,
    },

    /// Key material could not be generated or parsed.
    #[error("identity error: {0}")]
    Key(#[from] snips_ssh::SshError),

    /// The key generation task died before producing a key.
    #[error("identity provisioning failed: {0}")]
    Provisioning(String),
}

impl SnipsError {
    pub(crate) fn missing(field: &'static str) -> Self {
        SnipsError::Validation {
            field,
            detail: "was not found".to_string(),
        }
    }

    pub(crate) fn malformed(field: &'static str, detail: impl Into<String>) -> Self {
        SnipsError::Validation {
            field,
            detail: detail.into(),
        }
    }
}

fn invariant_message(visibility: &Visibility, url_present: &bool) -> String {
    if *url_present {
        format!("snip visibility is {visibility} but a url was unexpectedly present")
    } else {
        format!("snip visibility is {visibility} but no url was present")
    }
}

impl From<russh::Error> for SnipsError {
    fn from(err: russh::Error) -> Self {
        SnipsError::Connection(err.to_string())
    }
}

/// Result type alias using SnipsError.
pub type Result<T> = std::result::Result<T, SnipsError>;
