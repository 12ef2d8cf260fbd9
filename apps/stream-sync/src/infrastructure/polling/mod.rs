//! Snapshot Poller
//!
//! Periodically refreshes the per-channel snapshots from the REST
//! surface. Each channel polls on its own cadence; a failed fetch is
//! logged and the previous snapshot stays in place until the next
//! tick succeeds.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::SnapshotSource;
use crate::domain::reconcile::decode_lenient;
use crate::domain::records::{ArbitrageOpportunity, Channel, PriceUpdate, YieldOpportunity};
use crate::infrastructure::store::MarketStore;

/// Poll cadence per channel.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    /// Price snapshot refresh interval.
    pub price_interval: Duration,
    /// Arbitrage snapshot refresh interval.
    pub arbitrage_interval: Duration,
    /// Yield snapshot refresh interval.
    pub yield_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            price_interval: Duration::from_secs(60),
            arbitrage_interval: Duration::from_secs(10),
            yield_interval: Duration::from_secs(60),
        }
    }
}

/// Runs the three per-channel refresh loops.
pub struct SnapshotPoller {
    source: Arc<dyn SnapshotSource>,
    store: Arc<MarketStore>,
    config: PollerConfig,
    cancel: CancellationToken,
}

impl SnapshotPoller {
    /// Create a poller feeding the given store.
    #[must_use]
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        store: Arc<MarketStore>,
        config: PollerConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            store,
            config,
            cancel,
        }
    }

    /// Spawn one refresh loop per channel and return their handles.
    #[must_use]
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let price = PollLoop {
            channel: Channel::Prices,
            interval: self.config.price_interval,
            source: self.source.clone(),
            store: self.store.clone(),
            cancel: self.cancel.clone(),
        };
        let arbitrage = PollLoop {
            channel: Channel::Arbitrage,
            interval: self.config.arbitrage_interval,
            source: self.source.clone(),
            store: self.store.clone(),
            cancel: self.cancel.clone(),
        };
        let yields = PollLoop {
            channel: Channel::Yield,
            interval: self.config.yield_interval,
            source: self.source,
            store: self.store,
            cancel: self.cancel,
        };

        vec![
            tokio::spawn(price.run()),
            tokio::spawn(arbitrage.run()),
            tokio::spawn(yields.run()),
        ]
    }
}

struct PollLoop {
    channel: Channel,
    interval: Duration,
    source: Arc<dyn SnapshotSource>,
    store: Arc<MarketStore>,
    cancel: CancellationToken,
}

impl PollLoop {
    async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        tracing::info!(
            channel = self.channel.as_str(),
            interval_secs = self.interval.as_secs(),
            "Snapshot poll loop started"
        );

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::info!(channel = self.channel.as_str(), "Snapshot poll loop stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.refresh().await;
                }
            }
        }
    }

    async fn refresh(&self) {
        let result = match self.channel {
            Channel::Prices => self.source.fetch_prices().await,
            Channel::Arbitrage => self.source.fetch_arbitrage().await,
            Channel::Yield => self.source.fetch_yields().await,
        };

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    channel = self.channel.as_str(),
                    error = %e,
                    "Snapshot fetch failed, keeping previous snapshot"
                );
                return;
            }
        };

        let fetched = raw.len();
        match self.channel {
            Channel::Prices => {
                let records: Vec<PriceUpdate> = decode_lenient(&raw);
                self.log_refresh(fetched, records.len());
                self.store.set_price_snapshot(records);
            }
            Channel::Arbitrage => {
                let records: Vec<ArbitrageOpportunity> = decode_lenient(&raw);
                self.log_refresh(fetched, records.len());
                self.store.set_arbitrage_snapshot(records);
            }
            Channel::Yield => {
                let records: Vec<YieldOpportunity> = decode_lenient(&raw);
                self.log_refresh(fetched, records.len());
                self.store.set_yield_snapshot(records);
            }
        }
    }

    fn log_refresh(&self, fetched: usize, kept: usize) {
        tracing::debug!(
            channel = self.channel.as_str(),
            fetched,
            kept,
            "Snapshot refreshed"
        );
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    /// Scripted source: hands out one canned response per call.
    #[derive(Default)]
    struct ScriptedSource {
        yields: Mutex<Vec<anyhow::Result<Vec<serde_json::Value>>>>,
    }

    #[async_trait]
    impl SnapshotSource for ScriptedSource {
        async fn fetch_prices(&self) -> anyhow::Result<Vec<serde_json::Value>> {
            Ok(vec![])
        }

        async fn fetch_arbitrage(&self) -> anyhow::Result<Vec<serde_json::Value>> {
            Ok(vec![])
        }

        async fn fetch_yields(&self) -> anyhow::Result<Vec<serde_json::Value>> {
            self.yields
                .lock()
                .pop()
                .unwrap_or_else(|| anyhow::bail!("script exhausted"))
        }
    }

    fn yield_record(address: &str, apy: f64) -> serde_json::Value {
        json!({
            "protocol_name": "osmosis",
            "pool_address": address,
            "chain": "osmosis",
            "apy": apy,
            "tvl": "100000",
            "timestamp": "2024-05-01T12:00:00Z"
        })
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_replaces_snapshot_wholesale() {
        let store = Arc::new(MarketStore::with_defaults());
        let source = ScriptedSource::default();
        source
            .yields
            .lock()
            .push(Ok(vec![yield_record("p1", 12.0), yield_record("p2", 30.0)]));

        let poll = PollLoop {
            channel: Channel::Yield,
            interval: Duration::from_secs(60),
            source: Arc::new(source),
            store: store.clone(),
            cancel: CancellationToken::new(),
        };
        poll.refresh().await;

        let merged = store.reconciled_yields();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].pool_address, "p2");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_keeps_previous_snapshot() {
        let store = Arc::new(MarketStore::with_defaults());
        let source = ScriptedSource::default();
        {
            let mut script = source.yields.lock();
            script.push(Err(anyhow::anyhow!("backend unavailable")));
            script.push(Ok(vec![yield_record("p1", 12.0)]));
        }

        let poll = PollLoop {
            channel: Channel::Yield,
            interval: Duration::from_secs(60),
            source: Arc::new(source),
            store: store.clone(),
            cancel: CancellationToken::new(),
        };

        poll.refresh().await;
        assert_eq!(store.reconciled_yields().len(), 1);

        // Second refresh fails; the first snapshot must survive.
        poll.refresh().await;
        assert_eq!(store.reconciled_yields().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_records_are_dropped_not_fatal() {
        let store = Arc::new(MarketStore::with_defaults());
        let source = ScriptedSource::default();
        source.yields.lock().push(Ok(vec![
            yield_record("p1", 12.0),
            json!({"pool_address": "p2"}),
        ]));

        let poll = PollLoop {
            channel: Channel::Yield,
            interval: Duration::from_secs(60),
            source: Arc::new(source),
            store: store.clone(),
            cancel: CancellationToken::new(),
        };
        poll.refresh().await;

        let merged = store.reconciled_yields();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].pool_address, "p1");
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loops_stop_on_cancel() {
        let store = Arc::new(MarketStore::with_defaults());
        let cancel = CancellationToken::new();
        let poller = SnapshotPoller::new(
            Arc::new(ScriptedSource::default()),
            store,
            PollerConfig::default(),
            cancel.clone(),
        );

        let handles = poller.spawn();
        cancel.cancel();

        for handle in handles {
            handle.await.expect("poll loop panicked");
        }
    }
}
