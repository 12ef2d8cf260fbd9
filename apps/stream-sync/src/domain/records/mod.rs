//! Market Data Record Types
//!
//! Typed records for the three push channels the backend exposes:
//! price ticks, arbitrage alerts, and yield updates. These shapes
//! mirror the backend's wire payloads.
//!
//! # Numeric fields
//!
//! The backend serializes `Decimal` fields as strings and `float`
//! fields as numbers, but connector payloads relayed verbatim may
//! carry either representation. `Decimal` fields accept both out of
//! the box; `f64` fields go through [`flexible_f64`] so a
//! decimal-formatted string like `"2.75"` still parses. A field that
//! parses as neither fails the whole record's deserialization, which
//! the lenient decode path in [`crate::domain::reconcile`] turns into
//! a drop.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Channels
// =============================================================================

/// A named topic the client can subscribe to for a category of push
/// events. The vocabulary is closed; unknown channel names fail parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Real-time price ticks.
    Prices,
    /// Cross-exchange arbitrage alerts.
    Arbitrage,
    /// Yield farming pool updates.
    Yield,
}

impl Channel {
    /// All channels, in a fixed order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Prices, Self::Arbitrage, Self::Yield]
    }

    /// Wire name of the channel.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prices => "prices",
            Self::Arbitrage => "arbitrage",
            Self::Yield => "yield",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prices" => Ok(Self::Prices),
            "arbitrage" => Ok(Self::Arbitrage),
            "yield" => Ok(Self::Yield),
            other => Err(UnknownChannel(other.to_string())),
        }
    }
}

/// Error for channel names outside the closed vocabulary.
#[derive(Debug, thiserror::Error)]
#[error("unknown channel: {0}")]
pub struct UnknownChannel(pub String);

// =============================================================================
// Connection state
// =============================================================================

/// Lifecycle state of the persistent push connection.
///
/// Owned exclusively by the stream client; consumers observe it
/// through the store's watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport open and no connect in flight.
    #[default]
    Disconnected,
    /// Transport open requested, handshake not yet complete.
    Connecting,
    /// Transport open and live.
    Connected,
}

impl ConnectionState {
    /// Human-readable state name, used in log fields.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

// =============================================================================
// Records
// =============================================================================

/// Real-time price tick for one symbol on one exchange.
///
/// # Wire Format (JSON)
/// ```json
/// {
///   "symbol": "ATOM/USDT",
///   "exchange": "binance",
///   "price": "9.41",
///   "volume_24h": "1250000",
///   "timestamp": "2024-05-01T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Trading pair symbol (e.g. "ATOM/USDT").
    pub symbol: String,

    /// Source exchange identifier.
    pub exchange: String,

    /// Last traded price.
    pub price: Decimal,

    /// Rolling 24h volume in quote currency.
    pub volume_24h: Decimal,

    /// Best bid, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<Decimal>,

    /// Best ask, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<Decimal>,

    /// Generation timestamp (RFC-3339).
    pub timestamp: DateTime<Utc>,
}

/// Cross-exchange arbitrage opportunity alert.
///
/// # Wire Format (JSON)
/// ```json
/// {
///   "opportunity_id": "arb-binance-kucoin-atom-1714564800",
///   "token_symbol": "ATOM",
///   "buy_exchange": "kucoin",
///   "buy_price": "9.38",
///   "sell_exchange": "binance",
///   "sell_price": "9.52",
///   "profit_percent": 1.49,
///   "volume_available": "42000",
///   "net_profit": "590.15",
///   "timestamp": "2024-05-01T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageOpportunity {
    /// Stable identity of the opportunity.
    pub opportunity_id: String,

    /// Token being arbitraged.
    pub token_symbol: String,

    /// Exchange to buy on.
    pub buy_exchange: String,

    /// Buy-side price.
    pub buy_price: Decimal,

    /// Exchange to sell on.
    pub sell_exchange: String,

    /// Sell-side price.
    pub sell_price: Decimal,

    /// Gross spread as a percentage.
    #[serde(deserialize_with = "flexible_f64")]
    pub profit_percent: f64,

    /// Executable volume at the quoted prices.
    pub volume_available: Decimal,

    /// Profit after estimated execution costs.
    pub net_profit: Decimal,

    /// Generation timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Yield farming pool update.
///
/// # Wire Format (JSON)
/// ```json
/// {
///   "protocol_name": "osmosis",
///   "pool_address": "osmo1pool...",
///   "chain": "osmosis",
///   "token_pair": ["ATOM", "OSMO"],
///   "apy": 18.4,
///   "tvl": "1250000",
///   "daily_volume": "84000",
///   "timestamp": "2024-05-01T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldOpportunity {
    /// Protocol operating the pool.
    pub protocol_name: String,

    /// Pool contract address; stable identity of the record.
    pub pool_address: String,

    /// Chain the pool lives on.
    pub chain: String,

    /// Tokens in the pool.
    #[serde(default)]
    pub token_pair: Vec<String>,

    /// Annualized percentage yield.
    #[serde(deserialize_with = "flexible_f64")]
    pub apy: f64,

    /// Total value locked in quote currency.
    pub tvl: Decimal,

    /// Daily traded volume.
    #[serde(default)]
    pub daily_volume: Decimal,

    /// Generation timestamp.
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Flexible numerics
// =============================================================================

/// Deserialize an `f64` from either a JSON number or a
/// decimal-formatted string.
///
/// # Errors
///
/// Fails when the value is neither, which fails the containing
/// record.
pub fn flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(f64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn channel_round_trip() {
        for channel in Channel::all() {
            assert_eq!(Channel::from_str(channel.as_str()).unwrap(), *channel);
        }
    }

    #[test]
    fn channel_unknown_name_fails() {
        assert!(Channel::from_str("liquidations").is_err());
    }

    #[test]
    fn channel_serde_uses_wire_names() {
        let json = serde_json::to_string(&Channel::Yield).unwrap();
        assert_eq!(json, r#""yield""#);
        let back: Channel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Channel::Yield);
    }

    #[test]
    fn connection_state_default_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }

    #[test]
    fn price_update_decodes_string_decimals() {
        let json = r#"{
            "symbol": "ATOM/USDT",
            "exchange": "binance",
            "price": "9.41",
            "volume_24h": 1250000,
            "timestamp": "2024-05-01T12:00:00Z"
        }"#;

        let tick: PriceUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(tick.price, Decimal::from_str("9.41").unwrap());
        assert_eq!(tick.volume_24h, Decimal::from(1_250_000_u64));
        assert!(tick.bid.is_none());
    }

    #[test]
    fn arbitrage_profit_percent_accepts_string() {
        let json = r#"{
            "opportunity_id": "arb-1",
            "token_symbol": "ATOM",
            "buy_exchange": "kucoin",
            "buy_price": "9.38",
            "sell_exchange": "binance",
            "sell_price": "9.52",
            "profit_percent": "1.49",
            "volume_available": "42000",
            "net_profit": "590.15",
            "timestamp": "2024-05-01T12:00:00Z"
        }"#;

        let alert: ArbitrageOpportunity = serde_json::from_str(json).unwrap();
        assert!((alert.profit_percent - 1.49).abs() < f64::EPSILON);
    }

    #[test]
    fn arbitrage_malformed_profit_percent_fails_record() {
        let json = r#"{
            "opportunity_id": "arb-1",
            "token_symbol": "ATOM",
            "buy_exchange": "kucoin",
            "buy_price": "9.38",
            "sell_exchange": "binance",
            "sell_price": "9.52",
            "profit_percent": "not-a-number",
            "volume_available": "42000",
            "net_profit": "590.15",
            "timestamp": "2024-05-01T12:00:00Z"
        }"#;

        assert!(serde_json::from_str::<ArbitrageOpportunity>(json).is_err());
    }

    #[test]
    fn yield_opportunity_defaults_optional_fields() {
        let json = r#"{
            "protocol_name": "osmosis",
            "pool_address": "osmo1pool",
            "chain": "osmosis",
            "apy": 18.4,
            "tvl": "1250000",
            "timestamp": "2024-05-01T12:00:00Z"
        }"#;

        let pool: YieldOpportunity = serde_json::from_str(json).unwrap();
        assert!(pool.token_pair.is_empty());
        assert_eq!(pool.daily_volume, Decimal::ZERO);
    }

    #[test]
    fn unknown_top_level_fields_are_ignored() {
        let json = r#"{
            "protocol_name": "osmosis",
            "pool_address": "osmo1pool",
            "chain": "osmosis",
            "apy": "18.4",
            "tvl": "1250000",
            "timestamp": "2024-05-01T12:00:00Z",
            "rewards_tokens": ["OSMO"],
            "impermanent_loss_risk": 0.12
        }"#;

        let pool: YieldOpportunity = serde_json::from_str(json).unwrap();
        assert!((pool.apy - 18.4).abs() < f64::EPSILON);
    }
}
