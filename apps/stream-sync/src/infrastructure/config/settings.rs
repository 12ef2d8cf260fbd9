//! Sync Service Settings
//!
//! Configuration types for the synchronization core, loaded from
//! environment variables. Every knob has a default; an unset or
//! unparsable variable falls back to it, so the service always starts.

use std::time::Duration;

/// Push-channel connection settings.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Backend WebSocket endpoint.
    pub url: String,
    /// Fixed wait between reconnect attempts.
    pub reconnect_delay: Duration,
    /// Application-level ping cadence.
    pub heartbeat_interval: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/ws".to_string(),
            reconnect_delay: Duration::from_millis(5000),
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

/// Event buffer capacities.
#[derive(Debug, Clone, Copy)]
pub struct BufferSettings {
    /// Price tick buffer capacity.
    pub prices: usize,
    /// Arbitrage alert buffer capacity.
    pub arbitrage: usize,
    /// Yield update buffer capacity.
    pub yields: usize,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            prices: 100,
            arbitrage: 50,
            yields: 50,
        }
    }
}

/// Snapshot poll cadences.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    /// Price snapshot refresh interval.
    pub prices: Duration,
    /// Arbitrage snapshot refresh interval.
    pub arbitrage: Duration,
    /// Yield snapshot refresh interval.
    pub yields: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            prices: Duration::from_secs(60),
            arbitrage: Duration::from_secs(10),
            yields: Duration::from_secs(60),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Push-channel settings.
    pub stream: StreamSettings,
    /// Buffer capacities.
    pub buffers: BufferSettings,
    /// Poll cadences.
    pub polling: PollSettings,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stream_defaults = StreamSettings::default();
        let stream = StreamSettings {
            url: std::env::var("SYNC_WS_URL").unwrap_or(stream_defaults.url),
            reconnect_delay: parse_env_duration_millis(
                "SYNC_RECONNECT_DELAY_MS",
                stream_defaults.reconnect_delay,
            ),
            heartbeat_interval: parse_env_duration_secs(
                "SYNC_HEARTBEAT_INTERVAL_SECS",
                stream_defaults.heartbeat_interval,
            ),
        };

        let buffer_defaults = BufferSettings::default();
        let buffers = BufferSettings {
            prices: parse_env_usize("SYNC_PRICE_BUFFER_CAPACITY", buffer_defaults.prices),
            arbitrage: parse_env_usize("SYNC_ARBITRAGE_BUFFER_CAPACITY", buffer_defaults.arbitrage),
            yields: parse_env_usize("SYNC_YIELD_BUFFER_CAPACITY", buffer_defaults.yields),
        };

        let poll_defaults = PollSettings::default();
        let polling = PollSettings {
            prices: parse_env_duration_secs("SYNC_PRICE_POLL_SECS", poll_defaults.prices),
            arbitrage: parse_env_duration_secs("SYNC_ARBITRAGE_POLL_SECS", poll_defaults.arbitrage),
            yields: parse_env_duration_secs("SYNC_YIELD_POLL_SECS", poll_defaults.yields),
        };

        Self {
            stream,
            buffers,
            polling,
        }
    }
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_settings_defaults() {
        let settings = StreamSettings::default();
        assert_eq!(settings.url, "ws://127.0.0.1:8000/ws");
        assert_eq!(settings.reconnect_delay, Duration::from_millis(5000));
        assert_eq!(settings.heartbeat_interval, Duration::from_secs(30));
    }

    #[test]
    fn buffer_settings_defaults() {
        let settings = BufferSettings::default();
        assert_eq!(settings.prices, 100);
        assert_eq!(settings.arbitrage, 50);
        assert_eq!(settings.yields, 50);
    }

    #[test]
    fn poll_settings_defaults() {
        let settings = PollSettings::default();
        assert_eq!(settings.prices, Duration::from_secs(60));
        assert_eq!(settings.arbitrage, Duration::from_secs(10));
        assert_eq!(settings.yields, Duration::from_secs(60));
    }

    #[test]
    fn parse_helpers_fall_back_on_garbage() {
        // Not set at all.
        assert_eq!(parse_env_usize("SYNC_TEST_UNSET_VAR", 7), 7);
        assert_eq!(
            parse_env_duration_secs("SYNC_TEST_UNSET_VAR", Duration::from_secs(3)),
            Duration::from_secs(3)
        );
    }
}
