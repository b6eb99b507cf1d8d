//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only the
//! rendered results. `RUST_LOG` overrides the level chosen by -v / -q.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool, quiet: bool, no_color: bool) {
    let default_level = if quiet {
        "error"
    } else if verbose {
        "aacboard=debug,info"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .try_init();
}
