//! Tracing setup for hosts embedding the calculator.
use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "TRIO_LOG";

/// Install a `fmt` subscriber filtered by `TRIO_LOG` (default `info`).
///
/// Panics if a global subscriber is already set; hosts call this once at startup.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// Install a subscriber with an explicit filter, returning `false` if one was already set.
pub fn try_init_tracing_with_filter(filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .with_test_writer()
        .try_init()
        .is_ok()
}
