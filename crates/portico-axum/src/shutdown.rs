//! Graceful shutdown signaling.
//!
//! A [`ShutdownSignal`] coordinates shutdown between [`AxumServer::stop`]
//! and the background serve task: `stop` triggers it, the serve loop awaits
//! it. It can also be wired to OS signals so a host can drive
//! `Lifecycle::run_shutdown` on SIGTERM/SIGINT.
//!
//! [`AxumServer::stop`]: crate::AxumServer::stop

use std::sync::Arc;

use tokio::sync::watch;

/// A trigger-once, await-many shutdown signal.
///
/// Clones share the same underlying channel; triggering any clone wakes
/// every waiter, including waiters that subscribe after the trigger.
///
/// # Example
///
/// ```rust
/// use portico_axum::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// assert!(!shutdown.is_shutdown());
///
/// shutdown.trigger();
/// assert!(shutdown.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    /// Creates a new, untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Triggers the signal, waking all waiters.
    ///
    /// Safe to call multiple times; later calls are no-ops.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    /// Returns `true` once the signal has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Waits until the signal is triggered.
    ///
    /// Completes immediately when the signal was already triggered.
    pub async fn recv(&self) {
        let mut receiver = self.sender.subscribe();
        // wait_for errs only when the sender is gone, which cannot happen
        // while `self` holds it.
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }

    /// Creates a signal that triggers on SIGTERM or SIGINT.
    ///
    /// # Panics
    ///
    /// Panics if the OS signal handlers cannot be registered.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let trigger = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            trigger.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Waits for SIGTERM or SIGINT (Ctrl+C on non-Unix platforms).
async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("received SIGINT, initiating graceful shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to wait for Ctrl+C");
        tracing::info!("received Ctrl+C, initiating graceful shutdown");
    }
}
