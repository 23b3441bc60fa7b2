//! Process lifecycle coordination.
//!
//! # Responsibilities
//! - Fan the interrupt signal out to every long-running task
//! - Let tests drive shutdown without sending a real signal
//!
//! # Design Decisions
//! - A broadcast channel carries the signal; receivers can be resubscribed,
//!   which the server uses to arm the drain and the grace timer separately

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a task that triggers shutdown when the process is interrupted.
pub fn trigger_on_interrupt(shutdown: Shutdown) {
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install interrupt handler");
            return;
        }
        tracing::info!("interrupt received");
        shutdown.trigger();
    });
}
