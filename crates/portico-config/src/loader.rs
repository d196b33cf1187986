//! Layered configuration loading.
//!
//! The loader applies configuration in layers, later layers overriding
//! earlier ones:
//!
//! 1. built-in defaults,
//! 2. a configuration file (TOML or JSON, `[http]` section),
//! 3. environment variables (`HTTP_HOST`, `HTTP_PORT`, `HTTP_MODE`).
//!
//! # Example
//!
//! ```no_run
//! use portico_config::ConfigLoader;
//!
//! # fn main() -> Result<(), portico_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("config.toml")?
//!     .with_env()?
//!     .load()?;
//! # Ok(())
//! # }
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::{HttpConfig, Mode};
use crate::error::ConfigError;

/// Environment override for the bind host.
pub const ENV_HOST: &str = "HTTP_HOST";
/// Environment override for the bind port.
pub const ENV_PORT: &str = "HTTP_PORT";
/// Environment override for the engine run mode.
pub const ENV_MODE: &str = "HTTP_MODE";

/// On-disk configuration shape: the `http` section of a larger file.
///
/// Unknown sibling sections are ignored so the serving layer can share a
/// file with other modules; unknown keys inside `[http]` are rejected.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    http: HttpConfig,
}

/// Layered configuration loader.
#[derive(Debug)]
pub struct ConfigLoader {
    config: HttpConfig,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader primed with the built-in defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HttpConfig::default(),
        }
    }

    /// Resets to the built-in defaults.
    ///
    /// Called implicitly by [`new`](Self::new); chainable for clarity.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = HttpConfig::default();
        self
    }

    /// Layers a configuration file over the current values.
    ///
    /// The format is chosen by extension: `.toml` or `.json`. The file's
    /// `[http]` section replaces the current values wholesale; fields the
    /// section omits fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Parse`] on malformed content or unknown `[http]`
    /// keys, and [`ConfigError::UnsupportedFormat`] for other extensions.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let file: FileConfig = match extension.as_str() {
            "toml" => toml::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?,
            "json" => serde_json::from_str(&contents).map_err(|e| ConfigError::Parse {
                path: display,
                message: e.to_string(),
            })?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        self.config = file.http;
        Ok(self)
    }

    /// Layers `HTTP_HOST`, `HTTP_PORT`, and `HTTP_MODE` from the process
    /// environment over the current values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a non-numeric port or an
    /// unknown mode.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_lookup(|key| env::var(key).ok())
    }

    /// Like [`with_env`](Self::with_env), with an injectable lookup.
    ///
    /// Keeps environment layering testable without mutating process-global
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a non-numeric port or an
    /// unknown mode.
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.config.host = host;
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.config.port = port.parse().map_err(|_| {
                ConfigError::invalid_value(
                    "http.port",
                    format!("{port:?} is not a port number"),
                )
            })?;
        }

        if let Some(mode) = lookup(ENV_MODE) {
            self.config.mode = Mode::from_str(&mode)?;
        }

        Ok(self)
    }

    /// Validates and returns the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when validation fails.
    pub fn load(self) -> Result<HttpConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
