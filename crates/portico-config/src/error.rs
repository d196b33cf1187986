//! Configuration error types.

use thiserror::Error;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path of the file.
        path: String,
        /// Parser diagnostic.
        message: String,
    },

    /// The file extension maps to no known format.
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A configuration value failed validation.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// The offending key, in `section.field` form.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Creates an [`ConfigError::InvalidValue`] error.
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::invalid_value("http.port", "must be between 1 and 65535");
        assert_eq!(
            err.to_string(),
            "invalid value for http.port: must be between 1 and 65535"
        );
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = ConfigError::UnsupportedFormat("yaml".to_string());
        assert!(err.to_string().contains("yaml"));
    }
}
