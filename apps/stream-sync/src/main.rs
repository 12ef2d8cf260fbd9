//! DeFi Stream Sync Binary
//!
//! Starts the market data synchronization service: one WebSocket
//! connection to the analytics backend plus the per-channel snapshot
//! poll loops.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin defi-stream-sync
//! ```
//!
//! # Environment Variables
//!
//! All optional:
//! - `SYNC_WS_URL`: Backend WebSocket endpoint (default: `ws://127.0.0.1:8000/ws`)
//! - `SYNC_RECONNECT_DELAY_MS`: Delay between reconnect attempts (default: 5000)
//! - `SYNC_HEARTBEAT_INTERVAL_SECS`: Ping cadence (default: 30)
//! - `SYNC_PRICE_BUFFER_CAPACITY`: Price buffer size (default: 100)
//! - `SYNC_ARBITRAGE_BUFFER_CAPACITY`: Arbitrage buffer size (default: 50)
//! - `SYNC_YIELD_BUFFER_CAPACITY`: Yield buffer size (default: 50)
//! - `SYNC_PRICE_POLL_SECS`: Price snapshot cadence (default: 60)
//! - `SYNC_ARBITRAGE_POLL_SECS`: Arbitrage snapshot cadence (default: 10)
//! - `SYNC_YIELD_POLL_SECS`: Yield snapshot cadence (default: 60)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use defi_stream_sync::infrastructure::telemetry;
use defi_stream_sync::{
    Channel, ClientConfig, MarketStore, MessageRouter, StoreConfig, StreamClient,
    SubscriptionRegistry, SyncConfig, WsConnector,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    telemetry::init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting DeFi Stream Sync");

    let config = SyncConfig::from_env();
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let store = Arc::new(MarketStore::new(StoreConfig {
        price_capacity: config.buffers.prices,
        arbitrage_capacity: config.buffers.arbitrage,
        yield_capacity: config.buffers.yields,
    }));

    let registry = Arc::new(SubscriptionRegistry::new());

    let router = MessageRouter::new(Arc::clone(&store), None);
    let connector = Arc::new(WsConnector::new(config.stream.url.clone()));

    let (client, handle) = StreamClient::new(
        connector,
        router,
        Arc::clone(&registry),
        Arc::clone(&store),
        ClientConfig {
            reconnect_delay: config.stream.reconnect_delay,
            heartbeat_interval: config.stream.heartbeat_interval,
        },
        shutdown_token.clone(),
    );

    // All channels active by default; the registry survives drops and
    // is replayed on every reconnect.
    handle.subscribe(Channel::all()).await;

    let client_handle = tokio::spawn(client.run());

    tracing::info!("Stream sync ready");

    await_shutdown(shutdown_token).await;

    if let Err(e) = client_handle.await {
        tracing::error!(error = %e, "Stream client task panicked");
    }

    let sizes = store.buffer_sizes();
    tracing::info!(
        prices = sizes.prices,
        arbitrage = sizes.arbitrage,
        yields = sizes.yields,
        "Stream sync stopped"
    );
    Ok(())
}

/// Load .env if present; absence is fine in production.
fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Log the parsed configuration.
fn log_config(config: &SyncConfig) {
    tracing::info!(
        url = %config.stream.url,
        reconnect_delay_ms = config.stream.reconnect_delay.as_millis(),
        heartbeat_secs = config.stream.heartbeat_interval.as_secs(),
        price_buffer = config.buffers.prices,
        arbitrage_buffer = config.buffers.arbitrage,
        yield_buffer = config.buffers.yields,
        "Configuration loaded"
    );
}

/// Wait for Ctrl+C or SIGTERM, then trigger cancellation.
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
