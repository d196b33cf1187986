//! The HTTP configuration types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Engine run mode.
///
/// An explicit construction parameter of the server, never process-global
/// state, so multiple servers with different modes can coexist in one
/// process (tests included). `Debug` enables the engine's request-trace
/// layer; `Release` and `Test` run quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Verbose development mode with per-request tracing.
    Debug,
    /// Production mode.
    #[default]
    Release,
    /// Test mode: like release, intended for quiet test logs.
    Test,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::invalid_value(
                "http.mode",
                format!("unknown mode {other:?}, expected debug, release, or test"),
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::Test => "test",
        };
        f.write_str(s)
    }
}

/// HTTP server configuration.
///
/// Immutable after loading; the server owns it exclusively.
///
/// # Example
///
/// ```rust
/// use portico_config::{HttpConfig, Mode};
///
/// let config = HttpConfig::default();
/// assert_eq!(config.host, "");
/// assert_eq!(config.port, 8080);
/// assert_eq!(config.mode, Mode::Release);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    /// Host to bind; empty means all interfaces.
    pub host: String,

    /// Port to bind, 1–65535.
    pub port: u16,

    /// Engine run mode.
    pub mode: Mode,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8080,
            mode: Mode::Release,
        }
    }
}

impl HttpConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the port is `0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::invalid_value(
                "http.port",
                "must be between 1 and 65535",
            ));
        }
        Ok(())
    }
}
