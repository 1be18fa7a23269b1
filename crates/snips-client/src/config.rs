// ABOUTME: Connection settings shared by every session a client opens.
// ABOUTME: Host, port, user, identity PEM, optional deadline and host key pin.

use std::time::Duration;

pub const DEFAULT_HOST: &str = "snips.sh";
pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_USERNAME: &str = "ubuntu";

/// Where and as whom to connect.
///
/// A client owns one of these and hands out read-only copies; the only
/// mutation after construction is filling in a generated key.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// PEM encoded private key. Generated on first use when absent.
    pub private_key: Option<String>,
    /// Deadline applied separately to connecting and to each exec.
    pub timeout: Option<Duration>,
    /// Expected `SHA256:` fingerprint of the server's host key.
    pub host_fingerprint: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: DEFAULT_USERNAME.to_string(),
            private_key: None,
            timeout: None,
            host_fingerprint: None,
        }
    }
}

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn with_private_key(mut self, pem: impl Into<String>) -> Self {
        self.private_key = Some(pem.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_host_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.host_fingerprint = Some(fingerprint.into());
        self
    }

    /// Copy of this config that logs in as `username` with the same key.
    pub fn impersonating(&self, username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("host_fingerprint", &self.host_fingerprint)
            .finish()
    }
}
