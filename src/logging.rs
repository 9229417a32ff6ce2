//! Logging setup
//!
//! Initializes the global tracing subscriber the way the host application
//! wants it: `RUST_LOG` wins when set, otherwise the configured level; the
//! fmt layer is pretty for development or JSON for production.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::config::LoggingConfig;

/// Install the global subscriber
///
/// Returns an error if a subscriber is already set, so an embedding
/// application keeps control of its own logging.
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("burnrate={}", config.level)),
    );

    let fmt_layer = if config.format == "json" {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
}
