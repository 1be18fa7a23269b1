// ABOUTME: Client library for the snips.sh paste service over SSH.
// ABOUTME: Uploads content, parses the service's terminal transcript, and signs links.

//! # snips-client
//!
//! snips.sh is only reachable over SSH: content is piped into an exec
//! channel and the service answers with a colourised terminal transcript.
//! This crate turns that exchange into a typed [`Snip`].
//!
//! ```text
//! SnipsClient::upload
//! ├── KeyProvisioner       # ensure an identity (generate once if absent)
//! ├── SessionTransport     # connect, exec, capture stdout until close
//! ├── sanitize             # strip escape sequences
//! ├── ParsedFields         # id, size, type, visibility, ssh command, url
//! └── Snip::from_fields    # presence checks + visibility/url rule
//! ```

mod client;
mod command;
mod config;
mod error;
pub mod parse;
mod provision;
mod sanitize;
mod sign;
mod snip;
mod ssh;
mod transport;

pub use client::SnipsClient;
pub use command::{UploadCommand, PRIVATE_FLAG};
pub use config::{ConnectionConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_USERNAME};
pub use error::{Result, SnipsError};
pub use parse::ParsedFields;
pub use provision::KeyProvisioner;
pub use sanitize::sanitize;
pub use sign::{impersonation_user, sign, sign_command_line, SIGN_TTL};
pub use snip::{Size, Snip, UploadOptions, Visibility};
pub use ssh::RusshTransport;
pub use transport::{Session, SessionTransport, TranscriptBuffer};
