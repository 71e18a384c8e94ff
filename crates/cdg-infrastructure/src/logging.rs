//! Structured logging with tracing
//!
//! Centralized logging setup for the binary. Level comes from the
//! `CDG_LOG` environment variable when set, otherwise from the logging
//! configuration.

use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cdg_domain::error::{Error, Result};

use crate::config::LoggingConfig;

/// Initialize logging with the provided configuration
///
/// Must be called at most once per process; a second call fails.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env("CDG_LOG").unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = Registry::default().with(filter);
    let result = if config.json_format {
        let layer = fmt::layer().json().with_target(true).with_writer(std::io::stderr);
        registry.with(layer).try_init()
    } else {
        let layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
        registry.with(layer).try_init()
    };

    result.map_err(|e| Error::Config {
        message: "logging already initialized".to_string(),
        source: Some(Box::new(e)),
    })
}

/// Validate a log level string
fn parse_log_level(level: &str) -> Result<&str> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "warning" | "error" => Ok(level),
        other => Err(Error::config(format!(
            "invalid log level {other:?}; expected trace, debug, info, warn, or error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_levels_accepted() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(parse_log_level(level).is_ok());
        }
    }

    #[test]
    fn test_invalid_level_rejected() {
        assert!(parse_log_level("verbose").is_err());
    }
}
