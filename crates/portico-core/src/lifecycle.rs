//! Host lifecycle hooks.
//!
//! [`Lifecycle`] is the boundary Portico consumes from the host
//! application's startup/shutdown machinery: an ordered set of
//! `on_start`/`on_stop` callbacks invoked exactly once each around the
//! process's broader lifecycle. The HTTP module attaches its server
//! `start`/`stop` here; hosts may append their own hooks (database pools,
//! schedulers) alongside.
//!
//! # Execution order
//!
//! - **Start hooks** run in registration order, before the host considers
//!   startup complete; the first failure aborts startup.
//! - **Stop hooks** run in reverse registration order (LIFO); failures are
//!   logged and collected, but shutdown continues.
//!
//! # Example
//!
//! ```rust
//! use portico_core::Lifecycle;
//!
//! let lifecycle = Lifecycle::new()
//!     .on_start(|| async { Ok(()) })
//!     .on_stop(|| async { Ok(()) });
//!
//! assert_eq!(lifecycle.start_hook_count(), 1);
//! assert_eq!(lifecycle.stop_hook_count(), 1);
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

/// Error type for lifecycle hook failures.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// A start hook failed; startup was aborted.
    #[error("start hook failed: {0}")]
    StartFailed(String),

    /// One or more stop hooks failed; shutdown ran to completion anyway.
    #[error("stop hook failed: {0}")]
    StopFailed(String),

    /// Generic hook error with an optional source.
    #[error("lifecycle hook error: {message}")]
    HookError {
        /// Error message.
        message: String,
        /// Optional source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LifecycleError {
    /// Creates a hook error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::HookError {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a hook error carrying a source error.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::HookError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for lifecycle hooks.
pub type LifecycleResult<T = ()> = Result<T, LifecycleError>;

/// A registered lifecycle hook.
pub type LifecycleHook =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = LifecycleResult> + Send>> + Send + Sync>;

/// Ordered start/stop hook registry.
#[must_use]
pub struct Lifecycle {
    start_hooks: Vec<(String, LifecycleHook)>,
    stop_hooks: Vec<(String, LifecycleHook)>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("start_hooks", &self.start_hooks.len())
            .field("stop_hooks", &self.stop_hooks.len())
            .finish()
    }
}

impl Lifecycle {
    /// Creates an empty lifecycle registry.
    pub fn new() -> Self {
        Self {
            start_hooks: Vec::new(),
            stop_hooks: Vec::new(),
        }
    }

    /// Registers a start hook. Start hooks run in registration order.
    pub fn on_start<F, Fut>(self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LifecycleResult> + Send + 'static,
    {
        let name = format!("start_{}", self.start_hooks.len());
        self.on_start_named(name, hook)
    }

    /// Registers a named start hook; the name appears in logs.
    pub fn on_start_named<F, Fut>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LifecycleResult> + Send + 'static,
    {
        let hook: LifecycleHook = Arc::new(move || Box::pin(hook()));
        self.start_hooks.push((name.into(), hook));
        self
    }

    /// Registers a stop hook. Stop hooks run in reverse registration order.
    pub fn on_stop<F, Fut>(self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LifecycleResult> + Send + 'static,
    {
        let name = format!("stop_{}", self.stop_hooks.len());
        self.on_stop_named(name, hook)
    }

    /// Registers a named stop hook; the name appears in logs.
    pub fn on_stop_named<F, Fut>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LifecycleResult> + Send + 'static,
    {
        let hook: LifecycleHook = Arc::new(move || Box::pin(hook()));
        self.stop_hooks.push((name.into(), hook));
        self
    }

    /// Returns the number of registered start hooks.
    #[must_use]
    pub fn start_hook_count(&self) -> usize {
        self.start_hooks.len()
    }

    /// Returns the number of registered stop hooks.
    #[must_use]
    pub fn stop_hook_count(&self) -> usize {
        self.stop_hooks.len()
    }

    /// Runs all start hooks in registration order.
    ///
    /// Stops at the first failure and returns it; later hooks do not run.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::StartFailed`] naming the failed hook.
    pub async fn run_startup(&self) -> LifecycleResult {
        for (name, hook) in &self.start_hooks {
            tracing::debug!(hook = %name, "running start hook");
            if let Err(e) = hook().await {
                tracing::error!(hook = %name, error = %e, "start hook failed");
                return Err(LifecycleError::StartFailed(format!(
                    "hook '{}' failed: {}",
                    name, e
                )));
            }
        }
        Ok(())
    }

    /// Runs all stop hooks in reverse registration order.
    ///
    /// Unlike startup, shutdown continues past failures; all errors are
    /// collected and returned together.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::StopFailed`] summarizing every failed hook.
    pub async fn run_shutdown(&self) -> LifecycleResult {
        let mut errors: Vec<String> = Vec::new();

        for (name, hook) in self.stop_hooks.iter().rev() {
            tracing::debug!(hook = %name, "running stop hook");
            if let Err(e) = hook().await {
                tracing::error!(hook = %name, error = %e, "stop hook failed");
                errors.push(format!("{}: {}", name, e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::StopFailed(errors.join("; ")))
        }
    }

    /// Appends another registry's hooks to this one.
    pub fn merge(mut self, other: Lifecycle) -> Self {
        self.start_hooks.extend(other.start_hooks);
        self.stop_hooks.extend(other.stop_hooks);
        self
    }
}
