//! # Portico Config
//!
//! Typed configuration for the Portico HTTP serving layer.
//!
//! Configuration is read once, before server construction, through a
//! layered [`ConfigLoader`]: built-in defaults, then an optional TOML or
//! JSON file, then environment variables. The resulting [`HttpConfig`] is
//! immutable and owned by the server.
//!
//! # Example
//!
//! ```rust
//! use portico_config::{ConfigLoader, Mode};
//!
//! # fn main() -> Result<(), portico_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_env_lookup(|key| match key {
//!         "HTTP_PORT" => Some("9090".to_string()),
//!         _ => None,
//!     })?
//!     .load()?;
//! assert_eq!(config.port, 9090);
//! assert_eq!(config.mode, Mode::Release);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod loader;

pub use config::{HttpConfig, Mode};
pub use error::ConfigError;
pub use loader::ConfigLoader;
