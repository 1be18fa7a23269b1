// ABOUTME: Configuration file loading and flag merging for the snips CLI.
// ABOUTME: Reads optional TOML settings, expands ~ and $VARS, and applies command-line overrides.

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use snips_client::ConnectionConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings read from `~/.config/snips/config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub identity_file: Option<String>,
    pub timeout_secs: Option<u64>,
    pub host_fingerprint: Option<String>,
}

impl FileConfig {
    /// Default location: `$XDG_CONFIG_HOME/snips/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        snips_ssh::xdg_config_dir().map(|d| d.join("config.toml"))
    }

    /// Load from `path`, or from the default location if it exists.
    ///
    /// An explicitly named file must exist; a missing default file just
    /// means no settings.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Connection flags; each overrides the matching config file key.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Service host
    #[arg(long, global = true, env = "SNIPS_HOST")]
    pub host: Option<String>,

    /// Service SSH port
    #[arg(long, global = true, env = "SNIPS_PORT")]
    pub port: Option<u16>,

    /// SSH username
    #[arg(long, global = true, env = "SNIPS_USER")]
    pub user: Option<String>,

    /// Private key file (created if missing)
    #[arg(long, short = 'i', global = true, env = "SNIPS_IDENTITY")]
    pub identity: Option<String>,

    /// Give up on connect or upload after this many seconds
    #[arg(long, global = true, env = "SNIPS_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Only trust a server whose host key has this SHA256 fingerprint
    #[arg(long, global = true, env = "SNIPS_HOST_FINGERPRINT")]
    pub host_fingerprint: Option<String>,
}

/// Effective settings after merging file and flags.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Connection config without a private key.
    pub connection: ConnectionConfig,
    pub identity_path: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(file: FileConfig, args: ConnectionArgs) -> Self {
        let mut connection = ConnectionConfig::default();
        if let Some(host) = args.host.or(file.host) {
            connection.host = host;
        }
        if let Some(port) = args.port.or(file.port) {
            connection.port = port;
        }
        if let Some(user) = args.user.or(file.user) {
            connection.username = user;
        }
        connection.timeout = args.timeout.or(file.timeout_secs).map(Duration::from_secs);
        connection.host_fingerprint = args.host_fingerprint.or(file.host_fingerprint);

        let identity_path = args
            .identity
            .or(file.identity_file)
            .map(|raw| expand_path(&raw))
            .or_else(snips_ssh::default_identity_path);

        Self {
            connection,
            identity_path,
        }
    }
}

/// Expand `~` and environment variables. Undefined variables are left as
/// written so the resulting path error names them.
fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}
