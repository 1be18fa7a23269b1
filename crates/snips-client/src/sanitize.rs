// ABOUTME: Terminal escape sequence removal for captured transcripts.
// ABOUTME: Strips CSI/SGR and OSC sequences while leaving every other character intact.

use regex::Regex;
use std::sync::LazyLock;

/// Matches one terminal control sequence.
///
/// Introducer is ESC or the single C1 CSI character (U+009B), then optional
/// private-marker bytes. Either an OSC-style body terminated by BEL/ST, or
/// numeric parameter groups separated by `;` and a single final byte.
static ESCAPE_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[\x1B\x{9B}][\[\]()#;?]*",
        r"(?:",
        r"(?:[A-Za-z0-9]*(?:;[-A-Za-z0-9/#&.:=?%@~_]*)*)?(?:\x07|\x1B\\|\x{9C})",
        r"|",
        r"(?:[0-9]{1,4}(?:;[0-9]{0,4})*)?[0-9A-PR-TZcf-nq-uy=><~]",
        r")",
    ))
    .expect("escape sequence pattern is valid")
});

/// Remove every terminal escape sequence from `text`.
///
/// Removal can splice a stray ESC onto the text after it and form a new
/// sequence, so passes repeat until nothing matches. The result is a fixed
/// point: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> String {
    let mut current = text.to_owned();
    while ESCAPE_SEQUENCE.is_match(&current) {
        current = ESCAPE_SEQUENCE.replace_all(&current, "").into_owned();
    }
    current
}
