//! The neutral server lifecycle trait.
//!
//! [`Server`] is the single seam across which the concrete engine is
//! substituted. A binding owns the engine instance and the network
//! listener; callers see only the lifecycle state machine:
//!
//! ```text
//! constructed ──start()──▶ listening ──stop()──▶ stopped
//! ```
//!
//! `constructed → listening` happens at most once per instance;
//! `listening → stopped` is idempotent (stopping twice, or before starting,
//! is a no-op).

use async_trait::async_trait;

use crate::error::ServerError;

/// Lifecycle contract for a bound HTTP server.
#[async_trait]
pub trait Server: Send + Sync {
    /// Binds the listener and begins serving on a background task.
    ///
    /// Returns once the bind has been accepted; it does not block for the
    /// lifetime of the accept loop. Serve-loop errors occurring after a
    /// successful bind are logged asynchronously and do not retroactively
    /// fail this call.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] when the listener cannot be bound, and
    /// [`ServerError::AlreadyStarted`] on a second call.
    async fn start(&self) -> Result<(), ServerError>;

    /// Gracefully shuts the server down.
    ///
    /// A no-op returning `Ok` when no listener is bound. Otherwise blocks
    /// until in-flight requests drain or the binding's fixed grace period
    /// elapses; the grace period does not inherit the caller's
    /// cancellation, so callers cannot shorten or extend it.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ShutdownTimeout`] when connections remained
    /// open past the grace period and were force-closed.
    async fn stop(&self) -> Result<(), ServerError>;

    /// Returns the configured bind address as a display string.
    ///
    /// Pure function of the configuration: `"host:port"`, or `":port"`
    /// when the host is empty (bind all interfaces). Callable in any state.
    fn addr(&self) -> String;
}
