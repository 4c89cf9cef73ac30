//! Tracing subscriber setup for applications and examples
//!
//! Library code only emits `tracing` events. Binaries that want them on
//! stderr call [`init_tracing`] once at startup.

use tracing_subscriber::EnvFilter;

/// Variable read for the log filter before falling back to `RUST_LOG`.
pub const LOG_ENV: &str = "HERALD_LOG";

/// Directive used when neither `HERALD_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `HERALD_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a formatting subscriber as the global default.
///
/// Fails if a global subscriber is already set.
///
/// ```rust,no_run
/// herald::observability::init_tracing().ok();
/// ```
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .try_init()
}
