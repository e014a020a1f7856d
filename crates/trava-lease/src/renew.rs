//! Background lease renewal
//!
//! The core protocol prescribes no renewal cadence; how much margin to leave
//! before expiry depends on the integrator's round-trip latency and
//! scheduling jitter. This task is an opt-in convenience that renews a held
//! lease on a caller-chosen interval until it is stopped or the lease is
//! lost. The interval must be comfortably shorter than the lease duration or
//! the lease will expire between ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::LeaseError;
use crate::lease::Lease;

/// Periodic renewal loop for one held lease.
pub struct RenewalTask {
    lease: Arc<Lease>,
    interval: Duration,
}

impl RenewalTask {
    pub fn new(lease: Arc<Lease>, interval: Duration) -> Self {
        Self { lease, interval }
    }

    /// Spawn the renewal loop onto the current runtime.
    ///
    /// The loop ends when the handle is stopped, when the lease is lost
    /// (`NotOwner`), or on a communication error — renewal is not retried
    /// through an ambiguous failure, since the lease may already be gone.
    pub fn spawn(self) -> RenewalHandle {
        let (stop_tx, mut stop_rx) = mpsc::channel(1);
        let task = tokio::spawn(async move {
            self.run(&mut stop_rx).await;
        });

        RenewalHandle { stop_tx, task }
    }

    async fn run(self, stop_rx: &mut mpsc::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.lease.renew().await {
                        Ok(()) => {
                            debug!(key = %self.lease.resource_key(), "background renewal succeeded");
                        }
                        Err(LeaseError::NotOwner) => {
                            warn!(key = %self.lease.resource_key(), "lease lost, stopping background renewal");
                            break;
                        }
                        Err(err) => {
                            error!(key = %self.lease.resource_key(), error = %err, "background renewal failed");
                            break;
                        }
                    }
                }
                _ = stop_rx.recv() => {
                    break;
                }
            }
        }
    }
}

/// Handle to a spawned [`RenewalTask`].
pub struct RenewalHandle {
    stop_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RenewalHandle {
    /// Ask the renewal loop to stop. Does not release the lease.
    pub fn stop(&self) {
        let _ = self.stop_tx.try_send(());
    }

    /// Wait for the renewal loop to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
