//! Tracing subscriber setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::CheckoutConfig;

/// Initialize a tracing subscriber with default configuration.
///
/// Uses the `RUST_LOG` environment variable to determine the log level,
/// defaulting to "info" if not set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_from_config(&CheckoutConfig::default())
}

/// Initialize using the config's `log_filter` as the fallback filter.
pub fn init_from_config(
    config: &CheckoutConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with_filter(&config.log_filter)
}

/// Initialize with `fallback` used when `RUST_LOG` is unset or invalid.
///
/// Fails if a global subscriber is already installed.
pub fn init_with_filter(fallback: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
