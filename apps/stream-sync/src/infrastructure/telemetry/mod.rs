//! Tracing Setup
//!
//! Structured logging via `tracing` with an `EnvFilter`-driven level.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: standard filter directives; defaults keep this crate
//!   at `info` and the transport internals at `warn`.
//!
//! # Usage
//!
//! ```ignore
//! use defi_stream_sync::infrastructure::telemetry;
//!
//! telemetry::init();
//! tracing::info!("Starting");
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the global tracing subscriber.
///
/// Call once at startup; a second call is a no-op so tests that race
/// on initialization stay quiet.
#[allow(clippy::expect_used)]
pub fn init() {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(
            "defi_stream_sync=info"
                .parse()
                .expect("static directive 'defi_stream_sync=info' is valid"),
        )
        .add_directive(
            "tungstenite=warn"
                .parse()
                .expect("static directive 'tungstenite=warn' is valid"),
        )
        .add_directive(
            "tokio_tungstenite=warn"
                .parse()
                .expect("static directive 'tokio_tungstenite=warn' is valid"),
        );

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
