//! Push Channel Wire Messages
//!
//! Types for the JSON envelopes exchanged with the backend WebSocket
//! endpoint.
//!
//! # Inbound envelope
//!
//! ```json
//! { "type": "price_update", "data": { ... } }
//! { "type": "connected", "message": "Connected to DeFi Analytics WebSocket" }
//! { "type": "subscribed", "channels": ["prices"] }
//! { "type": "pong", "timestamp": "..." }
//! ```
//!
//! Unknown top-level fields are ignored. The inbound type set is
//! closed; anything else decodes to [`StreamMessage::Unknown`] and is
//! dropped by the router.
//!
//! # Outbound requests
//!
//! ```json
//! {"type":"subscribe","channels":["prices","yield"]}
//! {"type":"unsubscribe","channels":["arbitrage"]}
//! {"type":"ping"}
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::records::Channel;

/// Raw inbound envelope as sent by the server.
///
/// Payloads stay as raw JSON here; the router performs the typed
/// decode so a malformed payload degrades to a drop instead of a
/// connection error.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    /// Message type discriminant.
    #[serde(rename = "type")]
    pub msg_type: String,

    /// Event payload for data-bearing messages.
    #[serde(default)]
    pub data: Option<serde_json::Value>,

    /// Informational text for control messages.
    #[serde(default)]
    pub message: Option<String>,

    /// Channel list for subscription acknowledgments.
    #[serde(default)]
    pub channels: Option<Vec<String>>,
}

/// A classified inbound message.
#[derive(Debug, Clone)]
pub enum StreamMessage {
    /// Welcome notice sent right after the transport opens.
    Connected {
        /// Server greeting, if any.
        message: Option<String>,
    },
    /// Price tick payload for the prices channel.
    PriceUpdate {
        /// Raw record payload.
        data: serde_json::Value,
    },
    /// Arbitrage alert payload for the arbitrage channel.
    ArbitrageAlert {
        /// Raw record payload.
        data: serde_json::Value,
    },
    /// Yield update payload for the yield channel.
    YieldUpdate {
        /// Raw record payload.
        data: serde_json::Value,
    },
    /// Acknowledgment of a subscribe request.
    Subscribed {
        /// Channels the server now considers active.
        channels: Vec<String>,
    },
    /// Acknowledgment of an unsubscribe request.
    Unsubscribed {
        /// Channels the server removed.
        channels: Vec<String>,
    },
    /// Heartbeat acknowledgment.
    Pong,
    /// Server-side error notice; informational for this client.
    ServerError {
        /// Error description, if any.
        message: Option<String>,
    },
    /// Any type outside the closed set. Dropped with a debug log.
    Unknown {
        /// The unrecognized discriminant, for diagnostics.
        msg_type: String,
    },
}

impl From<Envelope> for StreamMessage {
    fn from(envelope: Envelope) -> Self {
        let data = envelope.data.unwrap_or(serde_json::Value::Null);
        match envelope.msg_type.as_str() {
            "connected" => Self::Connected {
                message: envelope.message,
            },
            "price_update" => Self::PriceUpdate { data },
            "arbitrage_alert" => Self::ArbitrageAlert { data },
            "yield_update" => Self::YieldUpdate { data },
            "subscribed" => Self::Subscribed {
                channels: envelope.channels.unwrap_or_default(),
            },
            "unsubscribed" => Self::Unsubscribed {
                channels: envelope.channels.unwrap_or_default(),
            },
            "pong" => Self::Pong,
            "error" => Self::ServerError {
                message: envelope.message,
            },
            _ => Self::Unknown {
                msg_type: envelope.msg_type,
            },
        }
    }
}

/// Outbound client request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundRequest {
    /// Subscribe to the given channels.
    Subscribe {
        /// Channels to activate.
        channels: Vec<Channel>,
    },
    /// Unsubscribe from the given channels.
    Unsubscribe {
        /// Channels to deactivate.
        channels: Vec<Channel>,
    },
    /// Liveness probe.
    Ping,
}

impl OutboundRequest {
    /// Build a subscribe request.
    #[must_use]
    pub fn subscribe(channels: Vec<Channel>) -> Self {
        Self::Subscribe { channels }
    }

    /// Build an unsubscribe request.
    #[must_use]
    pub fn unsubscribe(channels: Vec<Channel>) -> Self {
        Self::Unsubscribe { channels }
    }
}
