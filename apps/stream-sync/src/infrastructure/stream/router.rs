//! Message Router
//!
//! Dispatches classified inbound messages to the market store. Data
//! payloads get a typed decode here; a payload that fails to decode
//! is logged and dropped so one bad record never takes down the
//! connection.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::application::ports::AlertSink;
use crate::domain::records::{ArbitrageOpportunity, PriceUpdate, YieldOpportunity};
use crate::infrastructure::store::MarketStore;

use super::messages::StreamMessage;

/// Alerts at or below this profit percent are routine.
pub const HIGH_VALUE_PROFIT_PERCENT: f64 = 2.0;

/// Routes inbound stream messages into the store.
pub struct MessageRouter {
    store: Arc<MarketStore>,
    alerts: Option<Arc<dyn AlertSink>>,
}

impl MessageRouter {
    /// Create a router writing into the given store.
    #[must_use]
    pub fn new(store: Arc<MarketStore>, alerts: Option<Arc<dyn AlertSink>>) -> Self {
        Self { store, alerts }
    }

    /// Route one classified message.
    pub fn route(&self, message: StreamMessage) {
        match message {
            StreamMessage::Connected { message } => {
                tracing::info!(message = message.as_deref().unwrap_or(""), "Stream welcome");
            }
            StreamMessage::PriceUpdate { data } => {
                if let Some(tick) = decode_payload::<PriceUpdate>("price_update", data) {
                    tracing::debug!(symbol = %tick.symbol, exchange = %tick.exchange, "Price tick");
                    self.store.push_price(tick);
                }
            }
            StreamMessage::ArbitrageAlert { data } => {
                if let Some(alert) = decode_payload::<ArbitrageOpportunity>("arbitrage_alert", data)
                {
                    self.on_arbitrage(&alert);
                    self.store.push_arbitrage(alert);
                }
            }
            StreamMessage::YieldUpdate { data } => {
                if let Some(update) = decode_payload::<YieldOpportunity>("yield_update", data) {
                    tracing::debug!(
                        protocol = %update.protocol_name,
                        pool = %update.pool_address,
                        "Yield update"
                    );
                    self.store.push_yield(update);
                }
            }
            StreamMessage::Subscribed { channels } => {
                tracing::info!(?channels, "Subscription acknowledged");
            }
            StreamMessage::Unsubscribed { channels } => {
                tracing::info!(?channels, "Unsubscription acknowledged");
            }
            StreamMessage::Pong => {
                tracing::trace!("Heartbeat pong");
            }
            StreamMessage::ServerError { message } => {
                tracing::warn!(message = message.as_deref().unwrap_or(""), "Server error notice");
            }
            StreamMessage::Unknown { msg_type } => {
                tracing::debug!(msg_type = %msg_type, "Dropping unknown message type");
            }
        }
    }

    fn on_arbitrage(&self, alert: &ArbitrageOpportunity) {
        if alert.profit_percent > HIGH_VALUE_PROFIT_PERCENT {
            tracing::info!(
                opportunity_id = %alert.opportunity_id,
                token = %alert.token_symbol,
                profit_percent = alert.profit_percent,
                "High-value arbitrage opportunity"
            );
            if let Some(sink) = &self.alerts {
                sink.notify_high_value(alert);
            }
        } else {
            tracing::debug!(
                opportunity_id = %alert.opportunity_id,
                profit_percent = alert.profit_percent,
                "Arbitrage alert"
            );
        }
    }
}

fn decode_payload<T: DeserializeOwned>(kind: &str, data: serde_json::Value) -> Option<T> {
    match serde_json::from_value(data) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!(kind, error = %e, "Dropping malformed payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        alerts: Mutex<Vec<ArbitrageOpportunity>>,
    }

    impl AlertSink for RecordingSink {
        fn notify_high_value(&self, alert: &ArbitrageOpportunity) {
            self.alerts.lock().push(alert.clone());
        }
    }

    fn router_with_sink() -> (MessageRouter, Arc<MarketStore>, Arc<RecordingSink>) {
        let store = Arc::new(MarketStore::with_defaults());
        let sink = Arc::new(RecordingSink::default());
        let router = MessageRouter::new(store.clone(), Some(sink.clone()));
        (router, store, sink)
    }

    fn arbitrage_payload(profit_percent: f64) -> serde_json::Value {
        json!({
            "opportunity_id": "arb-1",
            "token_symbol": "ATOM",
            "buy_exchange": "osmosis",
            "buy_price": "9.50",
            "sell_exchange": "binance",
            "sell_price": "9.80",
            "profit_percent": profit_percent,
            "volume_available": "1000",
            "net_profit": "285.0",
            "timestamp": "2024-05-01T12:00:00Z"
        })
    }

    #[test]
    fn price_update_lands_in_buffer() {
        let (router, store, _sink) = router_with_sink();

        router.route(StreamMessage::PriceUpdate {
            data: json!({
                "symbol": "ATOM/USDT",
                "exchange": "osmosis",
                "price": "9.87",
                "volume_24h": "1000000",
                "timestamp": "2024-05-01T12:00:00Z"
            }),
        });

        let prices = store.prices();
        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].symbol, "ATOM/USDT");
    }

    #[test]
    fn malformed_payload_is_dropped_without_panic() {
        let (router, store, _sink) = router_with_sink();

        router.route(StreamMessage::PriceUpdate {
            data: json!({"symbol": "ATOM/USDT", "price": "not-a-number"}),
        });
        router.route(StreamMessage::YieldUpdate {
            data: serde_json::Value::Null,
        });

        assert!(store.prices().is_empty());
        assert!(store.yields().is_empty());
    }

    #[test]
    fn high_value_arbitrage_raises_alert() {
        let (router, store, sink) = router_with_sink();

        router.route(StreamMessage::ArbitrageAlert {
            data: arbitrage_payload(3.1),
        });

        assert_eq!(store.arbitrage().len(), 1);
        let alerts = sink.alerts.lock();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].opportunity_id, "arb-1");
    }

    #[test]
    fn routine_arbitrage_is_buffered_but_not_alerted() {
        let (router, store, sink) = router_with_sink();

        router.route(StreamMessage::ArbitrageAlert {
            data: arbitrage_payload(1.5),
        });

        assert_eq!(store.arbitrage().len(), 1);
        assert!(sink.alerts.lock().is_empty());
    }

    #[test]
    fn threshold_is_exclusive() {
        let (router, _store, sink) = router_with_sink();

        router.route(StreamMessage::ArbitrageAlert {
            data: arbitrage_payload(HIGH_VALUE_PROFIT_PERCENT),
        });

        assert!(sink.alerts.lock().is_empty());
    }

    #[test]
    fn control_messages_touch_no_buffers() {
        let (router, store, _sink) = router_with_sink();

        router.route(StreamMessage::Connected { message: None });
        router.route(StreamMessage::Subscribed {
            channels: vec!["prices".to_string()],
        });
        router.route(StreamMessage::Pong);
        router.route(StreamMessage::Unknown {
            msg_type: "mystery".to_string(),
        });

        let sizes = store.buffer_sizes();
        assert_eq!(sizes.prices + sizes.arbitrage + sizes.yields, 0);
    }
}
