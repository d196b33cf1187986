//! # Portico
//!
//! **A pluggable HTTP-server abstraction.**
//!
//! Application code registers routes and request handlers against a
//! neutral contract (`Router`, `Context`, `Server`) instead of a
//! concrete web-serving engine, so the engine can be swapped without
//! touching handler code. Portico ships:
//!
//! - **`portico-core`**: the neutral contract and the handler-aggregation
//!   protocol.
//! - **`portico-axum`**: the default binding, mapping the contract onto
//!   the axum engine with a non-blocking start and bounded graceful
//!   shutdown.
//! - **`portico-config`**: layered typed configuration (defaults, then
//!   file, then environment).
//! - **`portico-telemetry`**: structured logging bootstrap.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use portico::prelude::*;
//!
//! struct Ping;
//!
//! impl Handler for Ping {
//!     fn register_routes(&self, router: &mut dyn Router) {
//!         router.get(
//!             "/ping",
//!             handler_fn(|ctx: Context| async move {
//!                 ctx.string(http::StatusCode::OK, "pong");
//!                 Ok(())
//!             }),
//!         );
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::development())?;
//!     let config = ConfigLoader::new().with_env()?.load()?;
//!
//!     let (_server, lifecycle) = HttpModule::new(config)
//!         .with_handler(Arc::new(Ping))
//!         .install(Lifecycle::new())?;
//!
//!     lifecycle.run_startup().await?;
//!     ShutdownSignal::with_os_signals().recv().await;
//!     lifecycle.run_shutdown().await?;
//!     Ok(())
//! }
//! ```

// Re-export the neutral contract
pub use portico_core as core;

// Re-export the axum binding
pub use portico_axum as engine;

// Re-export configuration
pub use portico_config as config;

// Re-export telemetry
pub use portico_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use portico::prelude::*;
/// ```
pub mod prelude {
    pub use portico_core::{
        handler_fn, BindError, Context, Handler, HandlerError, HandlerFn, HandlerSet, Lifecycle,
        LifecycleError, LifecycleResult, Router, Server, ServerError,
    };

    pub use portico_axum::{AxumServer, HttpModule, ShutdownSignal, SHUTDOWN_GRACE};

    pub use portico_config::{ConfigError, ConfigLoader, HttpConfig, Mode};

    pub use portico_telemetry::{init_logging, LogConfig, TelemetryError};
}
