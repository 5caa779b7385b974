//! Tracing subscriber setup.
//!
//! Logs go to stderr so structured output on stdout stays parseable.

use tracing_subscriber::EnvFilter;

/// Pick the default filter directive for the given verbosity flags.
///
/// `RUST_LOG`, when set, takes precedence over this.
pub fn default_directive(verbose: bool, quiet: bool) -> String {
    let level = match (verbose, quiet) {
        (true, _) => "info",
        (false, true) => "error",
        (false, false) => "warn",
    };
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

/// Install the global tracing subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "tcpsweep=warn");
        assert_eq!(default_directive(true, false), "tcpsweep=info");
        assert_eq!(default_directive(false, true), "tcpsweep=error");
        assert_eq!(default_directive(true, true), "tcpsweep=info");
    }
}
