// ABOUTME: Field extraction from a sanitized upload transcript.
// ABOUTME: Six independent lookups, each returning None when its field is absent.

use crate::snip::Size;
use regex::Regex;
use std::sync::LazyLock;

static ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bid:[ \t]*([A-Za-z0-9_-]{10})(?:[^A-Za-z0-9_-]|$)").expect("id pattern is valid")
});

static SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bsize:[ \t]*([0-9]+)[ \t]*([A-Z])").expect("size pattern is valid")
});

static TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btype:[ \t]*([a-z]+)").expect("type pattern is valid"));

static VISIBILITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bvisibility:[ \t]*([a-z]+)").expect("visibility pattern is valid")
});

static SSH_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bssh ([^\r\n]*)").expect("ssh pattern is valid"));

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

/// Everything a transcript may say about an upload, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    pub id: Option<String>,
    pub size: Option<Size>,
    pub content_type: Option<String>,
    pub visibility: Option<String>,
    pub remote_shell_command: Option<String>,
    pub url: Option<String>,
}

impl ParsedFields {
    /// Run every extraction over an already sanitized transcript.
    pub fn extract(text: &str) -> Self {
        Self {
            id: id(text),
            size: size(text),
            content_type: content_type(text),
            visibility: visibility(text),
            remote_shell_command: remote_shell_command(text),
            url: url(text),
        }
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The 10-character token after `id:`.
pub fn id(text: &str) -> Option<String> {
    capture(&ID, text)
}

/// The integer and the first letter of its unit after `size:` (`12 MB` is
/// 12 with unit `M`), or nothing at all.
pub fn size(text: &str) -> Option<Size> {
    let caps = SIZE.captures(text)?;
    let value = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().chars().next()?;
    Some(Size { value, unit })
}

/// The lowercase content-type tag after `type:`.
pub fn content_type(text: &str) -> Option<String> {
    capture(&TYPE, text)
}

/// The lowercase word after `visibility:`. Not checked against known values.
pub fn visibility(text: &str) -> Option<String> {
    capture(&VISIBILITY, text)
}

/// The rest of the line after `ssh `, trimmed.
pub fn remote_shell_command(text: &str) -> Option<String> {
    let command = SSH_COMMAND.captures(text)?.get(1)?.as_str().trim();
    (!command.is_empty()).then(|| command.to_string())
}

/// The first `http://` or `https://` url, up to the next whitespace.
pub fn url(text: &str) -> Option<String> {
    URL.find(text).map(|m| m.as_str().to_string())
}
