//! Domain Layer - Core market data types and business logic.
//!
//! This layer contains the core domain types for the synchronization
//! core with no I/O dependencies. All types here are pure Rust with
//! serialization support.

/// Market data record types (prices, arbitrage, yields).
pub mod records;

/// Fixed-capacity, newest-first event buffers.
pub mod buffer;

/// Channel subscription bookkeeping.
pub mod subscription;

/// Stream/snapshot reconciliation and yield aggregation.
pub mod reconcile;
