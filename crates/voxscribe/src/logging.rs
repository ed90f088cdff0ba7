//! Process-wide tracing setup.
//!
//! `RUST_LOG` takes precedence over the configured level. Records emitted
//! through the `log` facade are bridged into tracing.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::error::LoggingError;

/// Builds the filter from `RUST_LOG`, falling back to `config.level`.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    let directive = match std::env::var("RUST_LOG") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => config.level.clone(),
    };

    EnvFilter::try_new(&directive)
        .map_err(|source| LoggingError::InvalidFilter { directive, source })
}

/// Installs the global subscriber.
///
/// Returns [`LoggingError::AlreadyInitialized`] if another subscriber got
/// there first; callers embedding the queue in a larger service can ignore it.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;

    let json_layer = config.json.then(|| fmt::layer().json().with_target(true));
    let text_layer = (!config.json).then(|| fmt::layer().with_target(true));

    let subscriber = Registry::default()
        .with(filter)
        .with(json_layer)
        .with(text_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    // A host application may already own the `log` logger.
    if tracing_log::LogTracer::init().is_err() {
        tracing::debug!("log facade already has a logger; skipping bridge");
    }

    Ok(())
}
