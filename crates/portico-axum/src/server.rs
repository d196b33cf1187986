//! The axum-backed server.
//!
//! [`AxumServer`] owns the concrete engine instance and the network
//! listener, and implements the neutral
//! [`Server`](portico_core::Server) lifecycle:
//!
//! ```text
//! constructed ──start()──▶ listening ──stop()──▶ stopped
//! ```
//!
//! The route table is owned by the server while *constructed* and is moved
//! into the background serve loop by [`AxumServer::start`]. That makes the
//! concurrency contract structural: registration is only possible before
//! `start`, and nothing can mutate the table concurrently with request
//! dispatch.
//!
//! # Architecture
//!
//! The serve loop is one background task per server: it accepts
//! connections and spawns one task per connection, with the engine
//! dispatching requests against the sealed route table. Shutdown flows
//! through a [`ShutdownSignal`]: the accept loop stops, every connection
//! switches to graceful shutdown, and [`AxumServer::stop`] waits for the
//! drain, bounded by [`SHUTDOWN_GRACE`], after which the loop (and with
//! it every remaining connection task) is aborted.
//!
//! # Bind errors
//!
//! `start` binds the listener before returning, so the initial bind
//! outcome is surfaced to the caller as [`ServerError::Bind`] instead of
//! being swallowed into a log line. Errors inside the serve loop after a
//! successful bind (accept failures, per-connection I/O errors) are
//! logged asynchronously and do not retroactively fail the
//! already-returned `start`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::{JoinHandle, JoinSet};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use portico_config::{HttpConfig, Mode};
use portico_core::{HandlerSet, Router, Server, ServerError};

use crate::recovery;
use crate::router::EngineRouter;
use crate::shutdown::ShutdownSignal;

/// Fixed grace period for draining in-flight requests during [`stop`].
///
/// Deliberately independent of the caller's cancellation context: callers
/// cannot shorten or extend it.
///
/// [`stop`]: AxumServer::stop
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Mutable server state, guarded by one lock.
///
/// `engine` is `Some` while *constructed*; `serve` is `Some` while
/// *listening*. Both are `None` once stopped.
struct Inner {
    engine: Option<axum::Router>,
    serve: Option<ServeHandle>,
}

/// Owned handles of a running serve loop.
struct ServeHandle {
    shutdown: ShutdownSignal,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

/// The axum binding of the neutral [`Server`] contract.
///
/// Exactly one `AxumServer` exists per HTTP module instance; it owns the
/// configuration, the engine, and (while listening) the bound listener.
///
/// # Example
///
/// ```rust,no_run
/// use portico_axum::AxumServer;
/// use portico_config::HttpConfig;
///
/// # async fn demo() -> Result<(), portico_core::ServerError> {
/// let server = AxumServer::new(HttpConfig::default());
/// server.start().await?;
/// // ...
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct AxumServer {
    config: Arc<HttpConfig>,
    inner: Mutex<Inner>,
}

impl AxumServer {
    /// Constructs a server in the *constructed* state.
    ///
    /// The engine is built with the built-in `GET /health` route; the
    /// panic-recovery middleware (and, in [`Mode::Debug`], the engine's
    /// request-trace layer) is applied when the table is sealed at
    /// `start`, so it also covers routes registered afterwards. The run
    /// mode is taken from `config`: an explicit construction parameter,
    /// never process-global state.
    #[must_use]
    pub fn new(config: HttpConfig) -> Self {
        let engine =
            axum::Router::new().route("/health", axum::routing::get(crate::health::health));

        Self {
            config: Arc::new(config),
            inner: Mutex::new(Inner {
                engine: Some(engine),
                serve: None,
            }),
        }
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Returns the configured bind address as a display string.
    ///
    /// `"host:port"`, or `":port"` when the host is empty. Pure function
    /// of the configuration; callable in any state.
    #[must_use]
    pub fn addr(&self) -> String {
        if self.config.host.is_empty() {
            format!(":{}", self.config.port)
        } else {
            format!("{}:{}", self.config.host, self.config.port)
        }
    }

    /// The address handed to the listener; an empty host binds all
    /// interfaces.
    fn bind_addr(&self) -> String {
        if self.config.host.is_empty() {
            format!("0.0.0.0:{}", self.config.port)
        } else {
            format!("{}:{}", self.config.host, self.config.port)
        }
    }

    /// Returns the actually-bound socket address while listening.
    ///
    /// Differs from [`addr`](Self::addr) when the configured port is `0`
    /// (ephemeral).
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.lock().serve.as_ref().map(|s| s.local_addr)
    }

    /// Returns `true` while the listener is bound and the serve loop runs.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.inner.lock().serve.is_some()
    }

    /// Resolves a handler collection against the root router adapter.
    ///
    /// Invokes every contributed handler's registration capability in
    /// contribution order. Must happen strictly before [`start`]; no
    /// request can ever observe a partially-populated route table.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyStarted`] once `start` has consumed
    /// the route table.
    ///
    /// [`start`]: AxumServer::start
    pub fn register(&self, handlers: &HandlerSet) -> Result<(), ServerError> {
        self.route_scope(|router| handlers.register_all(router))
    }

    /// Runs an ad-hoc registration closure against the root router
    /// adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyStarted`] once the route table has
    /// been consumed by `start`.
    pub fn route_scope<F>(&self, register: F) -> Result<(), ServerError>
    where
        F: FnOnce(&mut dyn Router),
    {
        let mut inner = self.inner.lock();
        if inner.engine.is_none() {
            return Err(ServerError::AlreadyStarted);
        }
        let mut root = EngineRouter::root(&mut inner.engine);
        register(&mut root);
        Ok(())
    }

    /// Escape hatch for advanced engine configuration.
    ///
    /// Applies `f` to the concrete engine before the server starts, e.g.
    /// to install global tower layers. Because the engine is moved into
    /// the serve loop at `start`, this cannot race active request
    /// handling: once started, the call fails instead.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyStarted`] once the engine has been
    /// consumed by `start`.
    pub fn with_engine<F>(&self, f: F) -> Result<(), ServerError>
    where
        F: FnOnce(axum::Router) -> axum::Router,
    {
        let mut inner = self.inner.lock();
        match inner.engine.take() {
            Some(engine) => {
                inner.engine = Some(f(engine));
                Ok(())
            }
            None => Err(ServerError::AlreadyStarted),
        }
    }

    /// Binds the listener and begins serving on a background task.
    ///
    /// Returns once the bind has been accepted; the serve loop does not
    /// block the caller. A failed bind restores the route table so the
    /// caller may reconfigure and retry.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] when the listener cannot be bound and
    /// [`ServerError::AlreadyStarted`] on a second call.
    pub async fn start(&self) -> Result<(), ServerError> {
        let engine = {
            let mut inner = self.inner.lock();
            inner.engine.take().ok_or(ServerError::AlreadyStarted)?
        };

        let bind_addr = self.bind_addr();
        let listener = match TcpListener::bind(&bind_addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.inner.lock().engine = Some(engine);
                return Err(ServerError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };
        let local_addr = match listener.local_addr() {
            Ok(addr) => addr,
            Err(source) => {
                self.inner.lock().engine = Some(engine);
                return Err(ServerError::Bind {
                    addr: bind_addr,
                    source,
                });
            }
        };

        tracing::info!(address = %self.addr(), "starting");

        let shutdown = ShutdownSignal::new();
        let app = seal(engine, self.config.mode);
        let task = tokio::spawn(serve_loop(
            listener,
            app,
            shutdown.clone(),
            self.addr(),
        ));

        self.inner.lock().serve = Some(ServeHandle {
            shutdown,
            task,
            local_addr,
        });
        Ok(())
    }

    /// Gracefully shuts the server down within [`SHUTDOWN_GRACE`].
    ///
    /// A no-op returning `Ok` when no listener is bound: calling `stop`
    /// twice, or before `start`, is not an error. Otherwise: stop
    /// accepting connections, let in-flight requests finish within the
    /// grace period, then force-close whatever remains.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ShutdownTimeout`] when the grace period
    /// expired with connections still open.
    pub async fn stop(&self) -> Result<(), ServerError> {
        self.stop_with_grace(SHUTDOWN_GRACE).await
    }

    pub(crate) async fn stop_with_grace(&self, grace: Duration) -> Result<(), ServerError> {
        let Some(handle) = self.inner.lock().serve.take() else {
            return Ok(());
        };

        tracing::info!(address = %self.addr(), "stopping");

        let ServeHandle {
            shutdown, mut task, ..
        } = handle;
        shutdown.trigger();

        match tokio::time::timeout(grace, &mut task).await {
            Ok(joined) => {
                if joined.is_err() {
                    tracing::error!(address = %self.addr(), "serve loop failed during shutdown");
                }
                tracing::info!(address = %self.addr(), "stopped");
                Ok(())
            }
            Err(_elapsed) => {
                // Aborting the serve loop drops its connection set, which
                // force-closes every remaining connection.
                task.abort();
                tracing::warn!(
                    address = %self.addr(),
                    grace = ?grace,
                    "graceful shutdown timed out, forcing close"
                );
                Err(ServerError::ShutdownTimeout(grace))
            }
        }
    }
}

#[async_trait]
impl Server for AxumServer {
    async fn start(&self) -> Result<(), ServerError> {
        Self::start(self).await
    }

    async fn stop(&self) -> Result<(), ServerError> {
        Self::stop(self).await
    }

    fn addr(&self) -> String {
        Self::addr(self)
    }
}

/// Seals the route table for serving: installs panic recovery over every
/// registered route and, in debug mode, the engine's request-trace layer.
pub(crate) fn seal(engine: axum::Router, mode: Mode) -> axum::Router {
    let engine = engine.layer(CatchPanicLayer::custom(recovery::handle_panic));
    if mode == Mode::Debug {
        engine.layer(TraceLayer::new_for_http())
    } else {
        engine
    }
}

/// Accepts connections until shutdown, then drains in-flight ones.
///
/// Each accepted connection runs on its own task inside a [`JoinSet`], so
/// aborting this loop aborts every connection with it. That is the
/// force-close path taken when the drain outlives the grace period.
async fn serve_loop(
    listener: TcpListener,
    app: axum::Router,
    shutdown: ShutdownSignal,
    address: String,
) {
    let mut connections: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, remote_addr)) => {
                        connections.spawn(handle_connection(
                            stream,
                            remote_addr,
                            app.clone(),
                            shutdown.clone(),
                        ));
                    }
                    Err(error) => {
                        tracing::error!(address = %address, error = %error, "listen error");
                    }
                }
            }

            () = shutdown.recv() => {
                break;
            }
        }
    }

    // Listener closes here; in-flight connections drain below. The caller
    // bounds this wait and aborts on expiry.
    tracing::debug!(
        address = %address,
        active = connections.len(),
        "draining connections"
    );
    while connections.join_next().await.is_some() {}
}

/// Serves one connection, switching to graceful shutdown on signal.
async fn handle_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    app: axum::Router,
    shutdown: ShutdownSignal,
) {
    let io = TokioIo::new(stream);
    let service = hyper::service::service_fn(move |request: hyper::Request<Incoming>| {
        let request = request.map(axum::body::Body::new);
        app.clone().oneshot(request)
    });

    let mut conn = std::pin::pin!(http1::Builder::new().serve_connection(io, service));
    let mut shutdown_requested = false;

    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(error) = result {
                    tracing::debug!(remote_addr = %remote_addr, error = %error, "connection error");
                }
                break;
            }

            () = shutdown.recv(), if !shutdown_requested => {
                // Stop keep-alive and finish the in-flight exchange; the
                // connection future completes once it is done.
                shutdown_requested = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}
