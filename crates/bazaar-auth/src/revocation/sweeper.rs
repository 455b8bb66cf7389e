//! Periodic removal of expired revocation entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::store::RevocationStore;

/// Runs [`RevocationStore::prune_expired`] on an interval until shut down.
///
/// Timing has no correctness impact: an expired but unpruned entry only
/// refers to a token that already fails its expiry check.
#[derive(Debug, Clone)]
pub struct RevocationSweeper {
    store: Arc<dyn RevocationStore>,
    interval: Duration,
}

impl RevocationSweeper {
    /// Creates a sweeper for the store.
    pub fn new(store: Arc<dyn RevocationStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs a single sweep. Returns the number of entries removed.
    pub async fn run_once(&self) -> u64 {
        match self.store.prune_expired().await {
            Ok(0) => {
                debug!("Revocation sweep found nothing to prune");
                0
            }
            Ok(removed) => {
                info!(removed = removed, "Pruned expired revocation entries");
                removed
            }
            Err(e) => {
                error!(error = %e, "Revocation sweep failed");
                0
            }
        }
    }

    /// Spawns the sweep loop. It exits when `shutdown` turns `true`.
    ///
    /// A zero interval is refused up front; the task logs and returns
    /// instead of ticking.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            if self.interval.is_zero() {
                error!("Revocation sweeper not started: interval is zero");
                return;
            }
            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await;
            info!(interval_secs = self.interval.as_secs(), "Revocation sweeper started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Revocation sweeper stopping");
                            break;
                        }
                    }
                }
            }
        })
    }
}
