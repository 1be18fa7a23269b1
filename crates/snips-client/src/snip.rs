// ABOUTME: The validated result of an upload and the value types it carries.
// ABOUTME: Builds a Snip from parsed fields, enforcing presence and visibility/url rules.

use crate::config::ConnectionConfig;
use crate::error::{Result, SnipsError};
use crate::parse::ParsedFields;
use crate::sign;
use crate::transport::SessionTransport;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Who can read a snip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = SnipsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(SnipsError::malformed(
                "visibility",
                format!("must be \"public\" or \"private\", got {other:?}"),
            )),
        }
    }
}

/// Upload size as the service reports it, e.g. `6 B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub value: u64,
    pub unit: char,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Options for a single upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Ask the service to keep the snip off its public web view.
    pub private: bool,
}

impl UploadOptions {
    pub fn private() -> Self {
        Self { private: true }
    }
}

/// A successfully uploaded snip.
///
/// `url` is `Some` exactly when `visibility` is [`Visibility::Public`].
/// The connection config it was uploaded with is kept so [`Snip::sign`] can
/// authenticate with the same key.
#[derive(Clone, Serialize)]
pub struct Snip {
    pub id: String,
    pub size: Size,
    #[serde(rename = "type")]
    pub content_type: String,
    pub visibility: Visibility,
    pub remote_shell_command: String,
    pub url: Option<String>,
    #[serde(skip)]
    config: Arc<ConnectionConfig>,
    #[serde(skip)]
    transport: Arc<dyn SessionTransport>,
}

impl Snip {
    /// Validate parsed fields and build a snip.
    ///
    /// Checks run in order (id, size, type, visibility, then the url rule)
    /// and the first failure is returned.
    pub(crate) fn from_fields(
        fields: ParsedFields,
        config: Arc<ConnectionConfig>,
        transport: Arc<dyn SessionTransport>,
    ) -> Result<Self> {
        let id = fields.id.ok_or_else(|| SnipsError::missing("id"))?;
        let size = fields.size.ok_or_else(|| SnipsError::missing("size"))?;
        let content_type = fields
            .content_type
            .ok_or_else(|| SnipsError::missing("type"))?;
        let visibility: Visibility = fields
            .visibility
            .ok_or_else(|| SnipsError::missing("visibility"))?
            .parse()?;

        let url = fields.url;
        match (visibility, url.is_some()) {
            (Visibility::Public, true) | (Visibility::Private, false) => {}
            (visibility, url_present) => {
                return Err(SnipsError::Invariant {
                    visibility,
                    url_present,
                })
            }
        }

        Ok(Self {
            id,
            size,
            content_type,
            visibility,
            remote_shell_command: fields.remote_shell_command.unwrap_or_default(),
            url,
            config,
            transport,
        })
    }

    /// Connection settings (including the key) this snip was uploaded with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Request a short-lived signed link for this snip.
    ///
    /// Returns the service's response text as received.
    pub async fn sign(&self) -> Result<String> {
        sign::sign(self.transport.as_ref(), &self.config, &self.id).await
    }
}

impl fmt::Debug for Snip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snip")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("content_type", &self.content_type)
            .field("visibility", &self.visibility)
            .field("remote_shell_command", &self.remote_shell_command)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Session;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl SessionTransport for Unreachable {
        async fn connect(&self, _config: &ConnectionConfig) -> Result<Box<dyn Session>> {
            Err(SnipsError::Connection("unreachable".to_string()))
        }
    }

    fn fields(visibility: &str, url: Option<&str>) -> ParsedFields {
        ParsedFields {
            id: Some("abcdefghij".to_string()),
            size: Some(Size { value: 6, unit: 'B' }),
            content_type: Some("plaintext".to_string()),
            visibility: Some(visibility.to_string()),
            remote_shell_command: Some("f:abcdefghij@snips.sh".to_string()),
            url: url.map(str::to_string),
        }
    }

    fn build(fields: ParsedFields) -> Result<Snip> {
        Snip::from_fields(
            fields,
            Arc::new(ConnectionConfig::default()),
            Arc::new(Unreachable),
        )
    }

    fn missing_field(result: Result<Snip>) -> &'static str {
        match result {
            Err(SnipsError::Validation { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_public_snip_with_url() {
        let snip = build(fields("public", Some("https://snips.sh/f/abcdefghij"))).unwrap();
        assert_eq!(snip.id, "abcdefghij");
        assert_eq!(snip.visibility, Visibility::Public);
        assert_eq!(snip.url.as_deref(), Some("https://snips.sh/f/abcdefghij"));
        assert_eq!(snip.size.to_string(), "6 B");
    }

    #[test]
    fn test_private_snip_without_url() {
        let snip = build(fields("private", None)).unwrap();
        assert_eq!(snip.visibility, Visibility::Private);
        assert!(snip.url.is_none());
    }

    #[test]
    fn test_private_with_url_is_rejected() {
        let err = build(fields("private", Some("https://snips.sh/f/abcdefghij"))).unwrap_err();
        assert!(matches!(
            err,
            SnipsError::Invariant {
                visibility: Visibility::Private,
                url_present: true
            }
        ));
    }

    #[test]
    fn test_public_without_url_is_rejected() {
        let err = build(fields("public", None)).unwrap_err();
        assert!(matches!(
            err,
            SnipsError::Invariant {
                visibility: Visibility::Public,
                url_present: false
            }
        ));
    }

    #[test]
    fn test_first_missing_field_is_reported() {
        let mut f = fields("public", None);
        f.id = None;
        f.size = None;
        assert_eq!(missing_field(build(f)), "id");

        let mut f = fields("public", None);
        f.size = None;
        f.content_type = None;
        assert_eq!(missing_field(build(f)), "size");

        let mut f = fields("public", None);
        f.content_type = None;
        assert_eq!(missing_field(build(f)), "type");

        let mut f = fields("public", None);
        f.visibility = None;
        assert_eq!(missing_field(build(f)), "visibility");
    }

    #[test]
    fn test_unknown_visibility_is_rejected() {
        assert_eq!(missing_field(build(fields("unlisted", None))), "visibility");
    }

    #[test]
    fn test_missing_remote_shell_command_is_tolerated() {
        let mut f = fields("private", None);
        f.remote_shell_command = None;
        assert_eq!(build(f).unwrap().remote_shell_command, "");
    }

    #[test]
    fn test_serializes_without_connection_details() {
        let snip = build(fields("public", Some("https://snips.sh/f/abcdefghij"))).unwrap();
        let json = serde_json::to_value(&snip).unwrap();

        assert_eq!(json["id"], "abcdefghij");
        assert_eq!(json["type"], "plaintext");
        assert_eq!(json["visibility"], "public");
        assert_eq!(json["size"]["value"], 6);
        assert_eq!(json["size"]["unit"], "B");
        assert!(json.get("config").is_none());
    }

    #[test]
    fn test_debug_omits_key_material() {
        let snip = build(fields("private", None)).unwrap();
        let debug = format!("{:?}", snip);
        assert!(debug.contains("abcdefghij"));
        assert!(!debug.contains("ConnectionConfig"));
    }

    #[test]
    fn test_visibility_round_trips_through_str() {
        for v in [Visibility::Public, Visibility::Private] {
            assert_eq!(v.as_str().parse::<Visibility>().unwrap(), v);
        }
    }
}
