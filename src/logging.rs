//! Logging initialization for the feedback analytics service.
//!
//! Logs go to stderr; request-level spans come from the HTTP trace layer.

use tracing_subscriber::EnvFilter;

/// Initializes logging with an environment-controlled filter.
///
/// Respects `RUST_LOG`; defaults to `info` when unset.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
