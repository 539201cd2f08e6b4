//! Logging initialization.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise `warn`, or `debug` when verbose.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) is not an error worth surfacing
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
