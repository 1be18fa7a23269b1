// ABOUTME: Shared logging setup for snips binaries
// ABOUTME: Two functions: init() for plain stderr, init_for() for crate-scoped verbosity

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Standard logging to stderr. Default: WARN level, RUST_LOG override.
///
/// Upload output goes to stdout, so anything chatty stays off by default.
pub fn init() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .init();
}

/// Crate-filtered logging to stderr. Default: WARN for everything, `level`
/// for every crate whose name starts with `crate_prefix`.
pub fn init_for(crate_prefix: &str, level: Level) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter_for(crate_prefix, level))
        .init();
}

/// Build the filter used by [`init_for`].
///
/// `snips` expands to directives for each library crate, since tracing
/// targets use the underscored module path (`snips_client`, `snips_ssh`).
fn filter_for(crate_prefix: &str, level: Level) -> EnvFilter {
    let target = crate_prefix.replace('-', "_");
    let mut filter = EnvFilter::from_default_env().add_directive(Level::WARN.into());
    for suffix in ["", "_client", "_ssh", "_cli"] {
        let directive = format!("{target}{suffix}={level}");
        match directive.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(_) => filter = filter.add_directive(level.into()),
        }
    }
    filter
}
