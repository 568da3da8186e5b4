//! Reconciliation sweep flipping stale PENDING click events to FAILED.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::repositories::ClickEventStore;
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{error, info};

/// Periodic reconciliation of deferred redirects that were never confirmed.
///
/// Each tick issues a single conditional bulk update: everything still
/// PENDING and older than the pending TTL transitions to FAILED. The
/// predicate re-checks status, so a confirmation racing in just ahead of the
/// sweep wins and its SUCCESS row is left untouched, and no event is swept
/// twice. Runs until the shutdown signal flips, checked between ticks.
pub struct ClickSweeper {
    store: Arc<dyn ClickEventStore>,
    pending_ttl: chrono::Duration,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl ClickSweeper {
    pub fn new(
        store: Arc<dyn ClickEventStore>,
        pending_ttl: Duration,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            pending_ttl: chrono::Duration::seconds(pending_ttl.as_secs() as i64),
            interval,
            shutdown,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        info!("Click sweeper started");
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        // First tick lands one full interval out.
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
                changed = self.shutdown.changed() => {
                    // A closed channel means the server is gone; stop too.
                    if changed.is_err() || *self.shutdown.borrow() {
                        info!("Click sweeper stopped");
                        return;
                    }
                }
            }
        }
    }

    /// One reconciliation pass.
    pub async fn sweep_once(&self) {
        let cutoff = Utc::now() - self.pending_ttl;

        match self.store.fail_expired_pending(cutoff).await {
            Ok(0) => {}
            Ok(count) => {
                info!(count, %cutoff, "expired pending click events marked failed");
            }
            Err(e) => {
                error!("failed to sweep expired pending click events: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockClickEventStore;
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use crate::error::AppError;

    fn sweeper_with(store: MockClickEventStore) -> (ClickSweeper, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        let sweeper = ClickSweeper::new(
            Arc::new(store),
            Duration::from_secs(60),
            Duration::from_millis(10),
            rx,
        );
        (sweeper, tx)
    }

    #[tokio::test]
    async fn test_sweep_once_uses_ttl_cutoff() {
        let mut store = MockClickEventStore::new();
        store
            .expect_fail_expired_pending()
            .withf(|cutoff: &DateTime<Utc>| {
                let age = Utc::now() - *cutoff;
                age > chrono::Duration::seconds(59) && age < chrono::Duration::seconds(61)
            })
            .times(1)
            .returning(|_| Ok(3));

        let (sweeper, _tx) = sweeper_with(store);
        sweeper.sweep_once().await;
    }

    #[tokio::test]
    async fn test_sweep_once_tolerates_store_failure() {
        let mut store = MockClickEventStore::new();
        store
            .expect_fail_expired_pending()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let (sweeper, _tx) = sweeper_with(store);
        // Errors are logged and absorbed; the next tick retries.
        sweeper.sweep_once().await;
    }

    #[tokio::test]
    async fn test_stop_signal_terminates_loop() {
        let mut store = MockClickEventStore::new();
        store.expect_fail_expired_pending().returning(|_| Ok(0));

        let (sweeper, tx) = sweeper_with(store);
        let handle = sweeper.spawn();

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_terminates_loop() {
        let mut store = MockClickEventStore::new();
        store.expect_fail_expired_pending().returning(|_| Ok(0));

        let (sweeper, tx) = sweeper_with(store);
        let handle = sweeper.spawn();

        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
