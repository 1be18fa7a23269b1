// ABOUTME: Upload command construction.
// ABOUTME: Pairs the command-line tokens with the payload streamed as channel input.

use crate::snip::UploadOptions;

/// Flag asking the service to store the snip privately.
pub const PRIVATE_FLAG: &str = "-private";

/// One upload: what to run remotely and what to feed it.
///
/// The upload verb is empty, so a default upload runs the bare command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCommand<'a> {
    pub tokens: Vec<&'static str>,
    pub payload: &'a [u8],
}

impl<'a> UploadCommand<'a> {
    pub fn new(payload: &'a [u8], options: UploadOptions) -> Self {
        let mut tokens = Vec::new();
        if options.private {
            tokens.push(PRIVATE_FLAG);
        }
        Self { tokens, payload }
    }

    pub fn command_line(&self) -> String {
        self.tokens.join(" ")
    }
}
