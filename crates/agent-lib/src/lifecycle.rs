//! Shutdown lifecycle
//!
//! One cancellation signal, fired manually (SIGINT), by the optional
//! run-length timeout, or programmatically. Periodic tasks poll it at
//! their tick boundaries; the main task blocks on it before exiting.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// One-way, idempotent cancellation handle
///
/// Cloning shares the signal; firing it twice is a no-op.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal. Safe to call any number of times.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-task view of the shutdown signal
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once cancellation has fired.
    ///
    /// A dropped sender counts as cancellation so tasks never hang on a
    /// handle that no longer exists.
    pub async fn cancelled(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Owns the shutdown signal and its derived cancellation sources
pub struct LifecycleController {
    shutdown: Shutdown,
}

impl LifecycleController {
    pub fn new() -> Self {
        Self {
            shutdown: Shutdown::new(),
        }
    }

    /// Handle for firing cancellation from other tasks (signal handler)
    pub fn shutdown(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Receiver for a periodic task
    pub fn subscribe(&self) -> ShutdownSignal {
        self.shutdown.subscribe()
    }

    /// Fire cancellation after `timeout` elapses.
    ///
    /// Spawns a one-shot timer; once fired it is indistinguishable from
    /// any other cancellation trigger.
    pub fn arm_timeout(&self, timeout: Duration) {
        let shutdown = self.shutdown.clone();
        info!(timeout_secs = timeout.as_secs(), "Run-length timeout armed");

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            info!("Timeout reached, shutting down");
            shutdown.cancel();
        });
    }

    /// Block until cancellation fires
    pub async fn wait(&self) {
        self.shutdown.subscribe().cancelled().await;
    }
}

impl Default for LifecycleController {
    fn default() -> Self {
        Self::new()
    }
}
