//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// Configuration loading.
pub mod config;

/// Snapshot poll loops.
pub mod polling;

/// Shared market data store.
pub mod store;

/// Push-channel client, codec, and router.
pub mod stream;

/// Tracing setup.
pub mod telemetry;
