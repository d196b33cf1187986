//! Telemetry error types.

use thiserror::Error;

/// Errors produced while initializing telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured log level/filter directive is invalid.
    #[error("invalid log filter {directive:?}: {message}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    InitFailed(String),
}
