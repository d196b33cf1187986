//! Module composition.
//!
//! [`HttpModule`] is the assembly step that turns configuration and a set
//! of contributed handlers into a running server wired to the host's
//! lifecycle:
//!
//! ```text
//! Config ─▶ Server construction ─▶ handler collection ─▶ route
//! registration ─▶ lifecycle attachment ─▶ start
//! ```
//!
//! All registration happens inside [`HttpModule::install`], strictly
//! before the `http.start` hook runs, so no request can arrive at a route
//! table that is still being populated.

use std::sync::Arc;

use portico_config::HttpConfig;
use portico_core::{Handler, HandlerSet, Lifecycle, LifecycleError, ServerError};

use crate::server::AxumServer;

/// Builder for the HTTP serving module.
///
/// Collects independently-constructed [`Handler`]s in contribution order,
/// then [`install`](HttpModule::install)s them into one server attached to
/// the host [`Lifecycle`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use portico_axum::HttpModule;
/// use portico_core::{handler_fn, Context, Handler, Lifecycle, Router};
/// use portico_config::HttpConfig;
///
/// struct Ping;
///
/// impl Handler for Ping {
///     fn register_routes(&self, router: &mut dyn Router) {
///         router.get(
///             "/ping",
///             handler_fn(|ctx: Context| async move {
///                 ctx.string(http::StatusCode::OK, "pong");
///                 Ok(())
///             }),
///         );
///     }
/// }
///
/// let (server, lifecycle) = HttpModule::new(HttpConfig::default())
///     .with_handler(Arc::new(Ping))
///     .install(Lifecycle::new())
///     .expect("install");
///
/// assert_eq!(lifecycle.start_hook_count(), 1);
/// assert_eq!(lifecycle.stop_hook_count(), 1);
/// # drop(server);
/// ```
#[must_use]
pub struct HttpModule {
    config: HttpConfig,
    handlers: HandlerSet,
}

impl HttpModule {
    /// Creates a module around an immutable configuration.
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            handlers: HandlerSet::new(),
        }
    }

    /// Contributes one handler; contribution order is registration order.
    pub fn with_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.add(handler);
        self
    }

    /// Contributes an already-aggregated handler collection.
    pub fn with_handlers(mut self, handlers: HandlerSet) -> Self {
        self.handlers = self.handlers.merge(handlers);
        self
    }

    /// Assembles the module.
    ///
    /// Builds the server, resolves the handler collection against the root
    /// router adapter (each handler exactly once, in contribution order),
    /// and appends `http.start`/`http.stop` hooks to `lifecycle`. The
    /// server starts only when the host runs
    /// [`Lifecycle::run_startup`].
    ///
    /// # Errors
    ///
    /// Currently only fails if the freshly-built server rejects
    /// registration, which would indicate a lifecycle violation.
    pub fn install(
        self,
        lifecycle: Lifecycle,
    ) -> Result<(Arc<AxumServer>, Lifecycle), ServerError> {
        let server = Arc::new(AxumServer::new(self.config));
        server.register(&self.handlers)?;
        tracing::debug!(
            handlers = self.handlers.len(),
            address = %server.addr(),
            "http module installed"
        );

        let start_server = Arc::clone(&server);
        let lifecycle = lifecycle.on_start_named("http.start", move || {
            let server = Arc::clone(&start_server);
            async move {
                server
                    .start()
                    .await
                    .map_err(|e| LifecycleError::with_source("http server failed to start", e))
            }
        });

        let stop_server = Arc::clone(&server);
        let lifecycle = lifecycle.on_stop_named("http.stop", move || {
            let server = Arc::clone(&stop_server);
            async move {
                server
                    .stop()
                    .await
                    .map_err(|e| LifecycleError::with_source("http server failed to stop", e))
            }
        });

        Ok((server, lifecycle))
    }
}
