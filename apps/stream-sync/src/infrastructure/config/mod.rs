//! Configuration Module
//!
//! Configuration loading for the synchronization service.

mod settings;

pub use settings::{BufferSettings, PollSettings, StreamSettings, SyncConfig};
