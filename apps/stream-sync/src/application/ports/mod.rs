//! Port Interfaces
//!
//! Interfaces (ports) for the external systems the sync core talks
//! to, following the Hexagonal Architecture pattern used across the
//! codebase.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`StreamConnector`] / [`StreamTransport`]: the push channel.
//!   The production adapter is the WebSocket transport in
//!   `infrastructure::stream`; tests script an in-memory transport.
//! - [`SnapshotSource`]: the polled REST-shaped snapshot fetch.
//!   HTTP plumbing lives behind this seam, outside the core.
//! - [`AlertSink`]: one-shot notification target for high-value
//!   arbitrage events.

use async_trait::async_trait;

use crate::domain::records::ArbitrageOpportunity;

// =============================================================================
// Stream transport
// =============================================================================

/// Errors surfaced by the stream transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Opening the transport failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Receiving failed; the transport is unusable afterwards.
    #[error("receive failed: {0}")]
    Recv(String),
}

/// One transport-level frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text frame carrying one JSON envelope.
    Text(String),
    /// Transport-level ping; answered with a pong.
    Ping(Vec<u8>),
    /// Transport-level pong.
    Pong(Vec<u8>),
    /// The peer closed the connection.
    Close,
}

/// Factory for push-channel connections.
///
/// Each successful call yields a fresh live transport; the connection
/// manager calls it again on every reconnect attempt.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    /// Open a new transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] when the handshake fails;
    /// the connection manager retries after its fixed delay.
    async fn connect(&self) -> Result<Box<dyn StreamTransport>, TransportError>;
}

/// One live, bidirectional push-channel connection.
#[async_trait]
pub trait StreamTransport: Send {
    /// Send a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] when the transport has gone
    /// away; the connection manager treats this as a close.
    async fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Receive the next frame. `None` means the stream ended.
    async fn recv(&mut self) -> Option<Result<Frame, TransportError>>;

    /// Answer a transport-level ping.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] when the transport has gone
    /// away; the connection manager treats this as a close.
    async fn pong(&mut self, data: Vec<u8>) -> Result<(), TransportError>;

    /// Close the transport. Errors are ignorable at teardown.
    async fn close(&mut self);
}

// =============================================================================
// Snapshot source
// =============================================================================

/// On-demand fetch of the current records for a channel.
///
/// Returns raw JSON values; lenient decoding happens in the poller so
/// a malformed record degrades to a drop rather than a failed poll.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the current price snapshot.
    ///
    /// # Errors
    ///
    /// Any fetch error; the poller logs it and keeps the previous
    /// snapshot.
    async fn fetch_prices(&self) -> anyhow::Result<Vec<serde_json::Value>>;

    /// Fetch the current arbitrage opportunities.
    ///
    /// # Errors
    ///
    /// Any fetch error; the poller logs it and keeps the previous
    /// snapshot.
    async fn fetch_arbitrage(&self) -> anyhow::Result<Vec<serde_json::Value>>;

    /// Fetch the current yield opportunities.
    ///
    /// # Errors
    ///
    /// Any fetch error; the poller logs it and keeps the previous
    /// snapshot.
    async fn fetch_yields(&self) -> anyhow::Result<Vec<serde_json::Value>>;
}

// =============================================================================
// Alerts
// =============================================================================

/// Notification target for high-value arbitrage alerts.
///
/// Raised at most once per routed event; the router never blocks on
/// it, so implementations must be cheap or hand off internally.
pub trait AlertSink: Send + Sync {
    /// Notify about a high-value opportunity.
    fn notify_high_value(&self, alert: &ArbitrageOpportunity);
}
