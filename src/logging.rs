//! Logging setup.
//!
//! The provider logs through `tracing`. Output goes to **stderr**; stdout
//! belongs to the plugin host.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives, e.g. `info` or `sonatyperepo_provider=debug`
//!
//! # Examples
//!
//! ```bash
//! # Request-level logs from the REST client
//! RUST_LOG=sonatyperepo_provider::client=debug ./provider
//!
//! # Everything at debug
//! RUST_LOG=debug ./provider
//! ```

use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter, Layer};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer() -> impl Layer<Registry> + Send + Sync {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}

/// Install the stderr subscriber at `info` unless `RUST_LOG` says otherwise.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LOG_LEVEL);
}

/// Like [`init_logging`], with a different fallback level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(stderr_layer())
        .with(filter(default_level))
        .init();
}

/// Install the subscriber if none is set yet. Returns whether it was installed.
///
/// Safe to call from tests and from code paths that may run twice.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(stderr_layer())
        .with(filter(DEFAULT_LOG_LEVEL))
        .try_init()
        .is_ok()
}
