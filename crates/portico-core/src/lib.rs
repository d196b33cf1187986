//! # Portico Core
//!
//! The neutral HTTP server contract for the Portico abstraction layer.
//!
//! Application code registers routes and request handlers against the types
//! in this crate ([`Router`], [`Context`], [`Server`], [`Handler`]) instead
//! of a concrete web-serving engine. A binding crate (such as `portico-axum`)
//! implements the contract on top of a specific engine, so the engine can be
//! swapped without touching handler code.
//!
//! # Architecture
//!
//! - [`Context`] wraps one in-flight request/response exchange behind an
//!   engine-independent surface: parameter and header lookups, body binding,
//!   and status/JSON/string response writers.
//! - [`Router`] exposes neutral verb registration plus [`Router::group`] for
//!   prefix scoping.
//! - [`Handler`] is the single capability independent components implement to
//!   contribute routes; [`HandlerSet`] aggregates them in contribution order.
//! - [`Server`] is the lifecycle seam: `start`, `stop`, `addr`.
//! - [`Lifecycle`] is the consumed boundary of the host application's
//!   startup/shutdown sequence.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use portico_core::{handler_fn, Context, Handler, HandlerSet, Router};
//!
//! struct UserApi;
//!
//! impl Handler for UserApi {
//!     fn register_routes(&self, router: &mut dyn Router) {
//!         router.get(
//!             "/users/:id",
//!             handler_fn(|ctx: Context| async move {
//!                 let id = ctx.param("id").to_owned();
//!                 ctx.string(http::StatusCode::OK, &id);
//!                 Ok(())
//!             }),
//!         );
//!     }
//! }
//!
//! let handlers = HandlerSet::new().with(Arc::new(UserApi));
//! assert_eq!(handlers.len(), 1);
//! ```

pub mod context;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod router;
pub mod server;

pub use context::{BodyWriter, Context};
pub use error::{BindError, HandlerError, ServerError};
pub use handler::{handler_fn, Handler, HandlerFn, HandlerFuture, HandlerSet};
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleResult};
pub use router::Router;
pub use server::Server;
