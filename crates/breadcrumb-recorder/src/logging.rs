//! Logging setup for the recorder binary

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is not set
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Install the global fmt subscriber
///
/// Calling this more than once keeps the first subscriber.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter()));
    let fmt_layer = fmt::layer().with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_ok() {
        tracing::info!(
            "{} {} logging initialized",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
    }
}
