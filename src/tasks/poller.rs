use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::api::ReserveSnapshot;
use crate::config::PollingConfig;
use crate::reserves::{mock_snapshot, ReserveSource};

/// Where a delivered snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    Live,
    /// The fetch failed and mock figures were substituted
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReserveUpdate {
    pub snapshot: ReserveSnapshot,
    pub origin: SnapshotOrigin,
}

type UpdateCallback = Arc<dyn Fn(ReserveUpdate) + Send + Sync>;

/// Periodic REST polling of reserves, run alongside the realtime socket
pub struct ReservePoller {
    source: Arc<dyn ReserveSource>,
    currencies: Vec<String>,
    interval: Duration,
    on_update: UpdateCallback,
    shutdown: broadcast::Receiver<()>,
}

impl ReservePoller {
    pub fn new<F>(
        config: &PollingConfig,
        source: Arc<dyn ReserveSource>,
        shutdown: broadcast::Receiver<()>,
        on_update: F,
    ) -> Self
    where
        F: Fn(ReserveUpdate) + Send + Sync + 'static,
    {
        Self {
            source,
            currencies: config.currencies.clone(),
            interval: Duration::from_secs(config.interval_seconds.max(1)),
            on_update: Arc::new(on_update),
            shutdown,
        }
    }

    /// Override the polling interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll until the shutdown signal fires; the first poll runs immediately
    pub async fn run(mut self) {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            currencies = ?self.currencies,
            "Reserve poller started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Reserve poller received shutdown signal");
                    break;
                }
                _ = timer.tick() => {
                    for update in self.poll_once().await {
                        (self.on_update)(update);
                    }
                }
            }
        }

        tracing::info!("Reserve poller stopped");
    }

    /// Fetch every configured currency once
    pub async fn poll_once(&self) -> Vec<ReserveUpdate> {
        let mut updates = Vec::with_capacity(self.currencies.len());

        for currency in &self.currencies {
            let update = match self.source.fetch_reserves(currency).await {
                Ok(snapshot) => ReserveUpdate {
                    snapshot,
                    origin: SnapshotOrigin::Live,
                },
                Err(e) => {
                    tracing::warn!(currency = %currency, error = %e, "Reserve fetch failed, using mock reserves");
                    ReserveUpdate {
                        snapshot: mock_snapshot(currency),
                        origin: SnapshotOrigin::Fallback,
                    }
                }
            };
            updates.push(update);
        }

        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FlakySource;

    #[async_trait]
    impl ReserveSource for FlakySource {
        async fn fetch_reserves(&self, currency: &str) -> Result<ReserveSnapshot> {
            if currency == "USD" {
                let mut snapshot = mock_snapshot("USD");
                snapshot.reserve_ratio = 101.5;
                Ok(snapshot)
            } else {
                Err(AppError::api(503, "Service Unavailable"))
            }
        }
    }

    fn config() -> PollingConfig {
        PollingConfig {
            interval_seconds: 1,
            currencies: vec!["USD".to_string(), "EUR".to_string()],
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_falls_back_to_mock() {
        let (_tx, rx) = broadcast::channel(1);
        let poller = ReservePoller::new(&config(), Arc::new(FlakySource), rx, |_| {});

        let updates = poller.poll_once().await;
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].origin, SnapshotOrigin::Live);
        assert_eq!(updates[0].snapshot.reserve_ratio, 101.5);
        assert_eq!(updates[1].origin, SnapshotOrigin::Fallback);
        assert_eq!(updates[1].snapshot, mock_snapshot("EUR"));
    }

    #[tokio::test]
    async fn test_run_delivers_until_shutdown() {
        let (tx, rx) = broadcast::channel(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let poller = ReservePoller::new(&config(), Arc::new(FlakySource), rx, move |update| {
            sink.lock().push(update.snapshot.currency);
        })
        .with_interval(Duration::from_millis(10));

        let handle = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(()).unwrap();
        handle.await.unwrap();

        let seen = seen.lock();
        assert!(seen.len() >= 2);
        assert_eq!(&seen[..2], &["USD".to_string(), "EUR".to_string()]);
    }
}
