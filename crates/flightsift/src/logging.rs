//! Process-wide log and trace output.
//!
//! Library modules log with `log` macros and the pipeline opens `tracing`
//! spans; [`init_logging`] routes both into one `tracing-subscriber` sink.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::ConfigError;

/// Installs the global subscriber and the `log` bridge.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `false` when a
/// global subscriber was already installed, in which case nothing changes.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = build_filter(config)?;

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.format {
        LogFormat::Text => Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .finish(),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .with_current_span(true)
                .finish(),
        ),
    };

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return Ok(false);
    }

    // A `log` logger may already exist when embedded in a larger program.
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!("log bridge not installed: {}", e);
    }

    tracing::debug!(level = %config.level, format = ?config.format, "Logging initialized");
    Ok(true)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            ConfigError::Logging(format!("invalid log level '{}': {}", config.level, e))
        }),
    }
}
