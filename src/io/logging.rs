//! Structured log output on stderr

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const fn default_filter(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Install the global subscriber; `RUST_LOG` overrides `fallback`
///
/// Later calls are no-ops, so tests may call this freely.
pub fn init_logging(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
