//! # Portico Axum
//!
//! The axum-based binding of the Portico HTTP server contract.
//!
//! This crate maps the neutral `portico-core` surface onto the axum engine
//! (tower/hyper stack): [`AxumServer`] owns the engine instance and the
//! network listener and implements the lifecycle state machine;
//! [`EngineRouter`] translates neutral route registrations into the
//! engine's route table; [`HttpModule`] performs the composition step that
//! aggregates contributed handlers, registers them, and attaches the
//! server to the host's [`Lifecycle`](portico_core::Lifecycle).
//!
//! Handlers written against `portico-core` never see an axum type; the
//! engine is an implementation detail behind this crate, reachable only
//! through the [`AxumServer::with_engine`] escape hatch.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use portico_axum::HttpModule;
//! use portico_core::{handler_fn, Context, Handler, Lifecycle, Router};
//! use portico_config::HttpConfig;
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
//!     let (server, lifecycle) = HttpModule::new(HttpConfig::default())
//!         .with_handler(Arc::new(Ping))
//!         .install(Lifecycle::new())?;
//!
//!     lifecycle.run_startup().await?;
//!     // ... host runs ...
//!     lifecycle.run_shutdown().await?;
//!     let _ = server;
//!     Ok(())
//! }
//! ```

mod health;
mod recovery;
pub mod module;
pub mod router;
pub mod server;
pub mod shutdown;

pub use module::HttpModule;
pub use router::EngineRouter;
pub use server::{AxumServer, SHUTDOWN_GRACE};
pub use shutdown::ShutdownSignal;
