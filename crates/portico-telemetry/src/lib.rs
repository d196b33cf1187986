//! # Portico Telemetry
//!
//! Structured logging bootstrap for the Portico serving layer.
//!
//! The serving crates emit structured events through [`tracing`]
//! (`"starting"`, `"stopped"`, `"listen error"`, each carrying the bind
//! address); this crate wires those events to an output. Hosts that already
//! install their own subscriber can skip it entirely.
//!
//! # Example
//!
//! ```rust,no_run
//! use portico_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development()).expect("logging initialized");
//! tracing::info!(address = ":8080", "starting");
//! ```

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T = ()> = Result<T, TelemetryError>;
