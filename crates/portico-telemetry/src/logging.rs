//! Structured logging over the tracing-subscriber ecosystem.
//!
//! Supports JSON output for production and human-readable output for
//! development, with an `EnvFilter`-style level directive. Initialization
//! is global and happens at most once per process; a second call fails
//! rather than silently replacing the subscriber.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level or filter directive (e.g. `"info"`, `"portico_axum=debug"`).
    pub level: String,

    /// Emit JSON-formatted events.
    pub json_format: bool,

    /// Include the event target (module path) in output.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: true,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Human-readable output at debug level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            include_target: true,
        }
    }

    /// JSON output at info level.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Quiet human-readable output for test runs.
    #[must_use]
    pub fn test() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            include_target: false,
        }
    }
}

/// Installs the global log subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the level directive does
/// not parse, and [`TelemetryError::InitFailed`] when a global subscriber
/// is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult {
    let filter = EnvFilter::try_new(&config.level).map_err(|e| TelemetryError::InvalidFilter {
        directive: config.level.clone(),
        message: e.to_string(),
    })?;

    let fmt_layer = if config.json_format {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(config.include_target)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(config.include_target)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| TelemetryError::InitFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let dev = LogConfig::development();
        assert_eq!(dev.level, "debug");
        assert!(!dev.json_format);

        let prod = LogConfig::production();
        assert_eq!(prod.level, "info");
        assert!(prod.json_format);

        let test = LogConfig::test();
        assert_eq!(test.level, "warn");
    }

    #[test]
    fn test_invalid_filter_is_rejected_before_install() {
        let config = LogConfig {
            level: "not==a==filter".to_string(),
            ..LogConfig::default()
        };
        let result = init_logging(&config);
        assert!(matches!(result, Err(TelemetryError::InvalidFilter { .. })));
    }

    // Global-subscriber behavior lives in one test: install once, then
    // observe that a second install fails instead of replacing it.
    #[test]
    fn test_init_is_once_per_process() {
        let config = LogConfig::test();
        init_logging(&config).expect("first install succeeds");

        let result = init_logging(&config);
        assert!(matches!(result, Err(TelemetryError::InitFailed(_))));
    }
}
