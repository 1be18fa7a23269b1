// ABOUTME: Signed-link requests for an existing snip.
// ABOUTME: Authenticates as the snip itself ("f:<id>") and returns the raw response.

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::transport::{run_once, SessionTransport};
use tracing::info;

/// Lifetime of a signed link.
pub const SIGN_TTL: &str = "5m";

/// Command line the service expects for a signed link.
pub fn sign_command_line() -> String {
    format!("sign -ttl {SIGN_TTL}")
}

/// Username that makes the service act on the snip `id`.
pub fn impersonation_user(id: &str) -> String {
    format!("f:{id}")
}

/// Ask the service for a signed link to snip `id`.
///
/// Uses `config`'s key with the username rewritten to `f:<id>`. The
/// response is returned as text, unparsed.
pub async fn sign(
    transport: &dyn SessionTransport,
    config: &ConnectionConfig,
    id: &str,
) -> Result<String> {
    let signer = config.impersonating(impersonation_user(id));
    let raw = run_once(transport, &signer, &sign_command_line(), &[]).await?;

    info!(id, bytes = raw.len(), "Signed snip");
    Ok(String::from_utf8_lossy(&raw).into_owned())
}
