#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::default_trait_access,
        clippy::items_after_statements
    )
)]

//! DeFi Stream Sync - Real-Time Market Data Synchronization
//!
//! Keeps a local, bounded view of a DeFi analytics backend in sync:
//! a WebSocket push channel delivers price ticks, arbitrage alerts,
//! and yield updates, while periodic REST-shaped snapshot polls fill
//! the gaps the stream misses. The two inputs are reconciled into
//! merged, ranked views.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Core data types and pure logic
//!   - `records`: Channels, connection state, market data records
//!   - `buffer`: Bounded newest-first event buffer
//!   - `subscription`: Desired channel set, replayed on reconnect
//!   - `reconcile`: Stream/snapshot merge and yield summaries
//!
//! - **Application**: Port definitions
//!   - `ports`: Transport, snapshot source, and alert interfaces
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `stream`: WebSocket client, JSON codec, message router
//!   - `polling`: Per-channel snapshot refresh loops
//!   - `store`: Shared buffers, snapshots, connection status
//!   - `config`: Environment-variable configuration
//!   - `telemetry`: Tracing setup
//!
//! # Data Flow
//!
//! ```text
//! Backend WS ──► StreamClient ──► JsonCodec ──► MessageRouter ──┐
//!                                                              ▼
//!                                                       ┌─────────────┐
//!                                                       │ MarketStore │──► merged views
//!                                                       └─────────────┘
//!                                                              ▲
//! Backend REST ──► SnapshotPoller ─────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core data types with no external integrations.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::buffer::BoundedBuffer;
pub use domain::reconcile::{
    GroupRollup, Reconcile, YieldSummary, reconcile, summarize_yields,
};
pub use domain::records::{
    ArbitrageOpportunity, Channel, ConnectionState, PriceUpdate, UnknownChannel, YieldOpportunity,
};
pub use domain::subscription::SubscriptionRegistry;

// Ports (for integration tests and alternative adapters)
pub use application::ports::{
    AlertSink, Frame, SnapshotSource, StreamConnector, StreamTransport, TransportError,
};

// Infrastructure config
pub use infrastructure::config::{BufferSettings, PollSettings, StreamSettings, SyncConfig};

// Stream client (for integration tests)
pub use infrastructure::stream::{
    ClientConfig, HIGH_VALUE_PROFIT_PERCENT, JsonCodec, MessageRouter, OutboundRequest,
    StreamClient, StreamHandle, StreamMessage, WsConnector,
};

// Poller and store
pub use infrastructure::polling::{PollerConfig, SnapshotPoller};
pub use infrastructure::store::{BufferSizes, MarketStore, StoreConfig};

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
