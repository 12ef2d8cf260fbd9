//! Market Store
//!
//! The explicitly constructed, explicitly owned shared context for
//! the synchronization core: the three bounded event buffers, the
//! latest polled snapshot per channel, and the connection-status
//! signal.
//!
//! Ownership discipline: buffers are mutated only by the message
//! router and snapshots only by the snapshot poller (single-writer);
//! every consumer reads through cloned views. Connection state is
//! written only by the stream client and observed through a watch
//! channel. The store is created at process start, shared via `Arc`,
//! and torn down by dropping it — there are no ambient singletons.

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::domain::buffer::BoundedBuffer;
use crate::domain::records::{
    ArbitrageOpportunity, ConnectionState, PriceUpdate, YieldOpportunity,
};
use crate::domain::reconcile::{self, YieldSummary};

/// Buffer capacities per channel.
#[derive(Debug, Clone, Copy)]
pub struct StoreConfig {
    /// Price tick buffer capacity.
    pub price_capacity: usize,
    /// Arbitrage alert buffer capacity.
    pub arbitrage_capacity: usize,
    /// Yield update buffer capacity.
    pub yield_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            price_capacity: 100,
            arbitrage_capacity: 50,
            yield_capacity: 50,
        }
    }
}

/// Shared in-memory view of the streaming market data.
#[derive(Debug)]
pub struct MarketStore {
    prices: RwLock<BoundedBuffer<PriceUpdate>>,
    arbitrage: RwLock<BoundedBuffer<ArbitrageOpportunity>>,
    yields: RwLock<BoundedBuffer<YieldOpportunity>>,

    price_snapshot: RwLock<Vec<PriceUpdate>>,
    arbitrage_snapshot: RwLock<Vec<ArbitrageOpportunity>>,
    yield_snapshot: RwLock<Vec<YieldOpportunity>>,

    state_tx: watch::Sender<ConnectionState>,
}

impl MarketStore {
    /// Create an empty store with the given buffer capacities.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let (state_tx, _state_rx) = watch::channel(ConnectionState::Disconnected);
        Self {
            prices: RwLock::new(BoundedBuffer::new(config.price_capacity)),
            arbitrage: RwLock::new(BoundedBuffer::new(config.arbitrage_capacity)),
            yields: RwLock::new(BoundedBuffer::new(config.yield_capacity)),
            price_snapshot: RwLock::new(Vec::new()),
            arbitrage_snapshot: RwLock::new(Vec::new()),
            yield_snapshot: RwLock::new(Vec::new()),
            state_tx,
        }
    }

    /// Create an empty store with default capacities (100/50/50).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(StoreConfig::default())
    }

    // =========================================================================
    // Connection status signal
    // =========================================================================

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Subscribe to connection state transitions.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Publish a state transition. Stream client only.
    pub(crate) fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            tracing::debug!(from = previous.as_str(), to = state.as_str(), "Connection state");
        }
    }

    // =========================================================================
    // Buffer writes (message router only)
    // =========================================================================

    pub(crate) fn push_price(&self, tick: PriceUpdate) {
        self.prices.write().push(tick);
    }

    pub(crate) fn push_arbitrage(&self, alert: ArbitrageOpportunity) {
        self.arbitrage.write().push(alert);
    }

    pub(crate) fn push_yield(&self, update: YieldOpportunity) {
        self.yields.write().push(update);
    }

    // =========================================================================
    // Snapshot writes (snapshot poller only)
    // =========================================================================

    pub(crate) fn set_price_snapshot(&self, records: Vec<PriceUpdate>) {
        *self.price_snapshot.write() = records;
    }

    pub(crate) fn set_arbitrage_snapshot(&self, records: Vec<ArbitrageOpportunity>) {
        *self.arbitrage_snapshot.write() = records;
    }

    pub(crate) fn set_yield_snapshot(&self, records: Vec<YieldOpportunity>) {
        *self.yield_snapshot.write() = records;
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Buffered price ticks, newest-first.
    #[must_use]
    pub fn prices(&self) -> Vec<PriceUpdate> {
        self.prices.read().to_vec()
    }

    /// Buffered arbitrage alerts, newest-first.
    #[must_use]
    pub fn arbitrage(&self) -> Vec<ArbitrageOpportunity> {
        self.arbitrage.read().to_vec()
    }

    /// Buffered yield updates, newest-first.
    #[must_use]
    pub fn yields(&self) -> Vec<YieldOpportunity> {
        self.yields.read().to_vec()
    }

    /// Merged price view: buffer reconciled with the latest poll.
    #[must_use]
    pub fn reconciled_prices(&self) -> Vec<PriceUpdate> {
        reconcile::reconcile(&self.prices(), &self.price_snapshot.read())
    }

    /// Merged arbitrage view, ranked by profit percent.
    #[must_use]
    pub fn reconciled_arbitrage(&self) -> Vec<ArbitrageOpportunity> {
        reconcile::reconcile(&self.arbitrage(), &self.arbitrage_snapshot.read())
    }

    /// Merged yield view, ranked by APY.
    #[must_use]
    pub fn reconciled_yields(&self) -> Vec<YieldOpportunity> {
        reconcile::reconcile(&self.yields(), &self.yield_snapshot.read())
    }

    /// Summary statistics over the merged yield view.
    #[must_use]
    pub fn yield_summary(&self) -> YieldSummary {
        reconcile::summarize_yields(&self.reconciled_yields())
    }

    /// Per-buffer sizes, for status logging.
    #[must_use]
    pub fn buffer_sizes(&self) -> BufferSizes {
        BufferSizes {
            prices: self.prices.read().len(),
            arbitrage: self.arbitrage.read().len(),
            yields: self.yields.read().len(),
        }
    }
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Buffer occupancy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSizes {
    /// Buffered price ticks.
    pub prices: usize,
    /// Buffered arbitrage alerts.
    pub arbitrage: usize,
    /// Buffered yield updates.
    pub yields: usize,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;

    fn tick(symbol: &str, minute: u32) -> PriceUpdate {
        PriceUpdate {
            symbol: symbol.to_string(),
            exchange: "binance".to_string(),
            price: Decimal::ONE,
            volume_24h: Decimal::ZERO,
            bid: None,
            ask: None,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        }
    }

    fn pool(address: &str, apy: f64, tvl: u64) -> YieldOpportunity {
        YieldOpportunity {
            protocol_name: "osmosis".to_string(),
            pool_address: address.to_string(),
            chain: "osmosis".to_string(),
            token_pair: vec![],
            apy,
            tvl: Decimal::from(tvl),
            daily_volume: Decimal::ZERO,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn starts_disconnected_and_empty() {
        let store = MarketStore::with_defaults();
        assert_eq!(store.state(), ConnectionState::Disconnected);
        assert!(store.prices().is_empty());
        assert!(store.arbitrage().is_empty());
        assert!(store.yields().is_empty());
    }

    #[test]
    fn state_transitions_are_observable() {
        let store = MarketStore::with_defaults();
        let rx = store.watch_state();

        store.set_state(ConnectionState::Connecting);
        store.set_state(ConnectionState::Connected);

        assert_eq!(store.state(), ConnectionState::Connected);
        assert_eq!(*rx.borrow(), ConnectionState::Connected);
    }

    #[test]
    fn price_buffer_respects_capacity() {
        let store = MarketStore::new(StoreConfig {
            price_capacity: 2,
            ..StoreConfig::default()
        });

        store.push_price(tick("A", 0));
        store.push_price(tick("B", 1));
        store.push_price(tick("C", 2));

        let prices = store.prices();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0].symbol, "C");
        assert_eq!(prices[1].symbol, "B");
    }

    #[test]
    fn reconciled_yields_merge_buffer_and_snapshot() {
        let store = MarketStore::with_defaults();

        // Stream delivered a fresher reading for p1.
        store.push_yield(pool("p1", 25.0, 100));
        store.set_yield_snapshot(vec![pool("p1", 10.0, 100), pool("p2", 40.0, 200)]);

        let merged = store.reconciled_yields();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].pool_address, "p2");
        assert!((merged[1].apy - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn yield_summary_covers_merged_view() {
        let store = MarketStore::with_defaults();
        store.push_yield(pool("p1", 10.0, 100));
        store.set_yield_snapshot(vec![pool("p2", 20.0, 300)]);

        let summary = store.yield_summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_tvl, Decimal::from(400_u64));
        assert!((summary.avg_apy - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn buffer_sizes_report_occupancy() {
        let store = MarketStore::with_defaults();
        store.push_price(tick("A", 0));
        store.push_yield(pool("p1", 10.0, 100));

        let sizes = store.buffer_sizes();
        assert_eq!(
            sizes,
            BufferSizes {
                prices: 1,
                arbitrage: 0,
                yields: 1
            }
        );
    }
}
