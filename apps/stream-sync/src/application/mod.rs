//! Application Layer - Port definitions.
//!
//! Contracts between the synchronization core and its external
//! collaborators. Infrastructure adapters implement these; tests
//! substitute scripted doubles.

/// Port interfaces for the transport, snapshot source, and alerts.
pub mod ports;
