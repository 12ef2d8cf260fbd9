//! Subscription Registry
//!
//! Tracks the set of channels the client wants active. The registry
//! is the durable side of subscription state: it survives disconnects
//! and is replayed in full when a connection is (re)established, so a
//! subscribe made while offline takes effect on the next connect.
//!
//! Membership changes are the only mutation; each channel appears at
//! most once.

use std::collections::BTreeSet;

use parking_lot::RwLock;

use crate::domain::records::Channel;

/// Thread-safe set of desired channel subscriptions.
///
/// # Example
///
/// ```rust
/// use defi_stream_sync::domain::records::Channel;
/// use defi_stream_sync::domain::subscription::SubscriptionRegistry;
///
/// let registry = SubscriptionRegistry::new();
///
/// let added = registry.add(&[Channel::Prices, Channel::Prices]);
/// assert_eq!(added, vec![Channel::Prices]);
///
/// // Adding again is a no-op.
/// assert!(registry.add(&[Channel::Prices]).is_empty());
///
/// assert_eq!(registry.active(), vec![Channel::Prices]);
/// ```
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    channels: RwLock<BTreeSet<Channel>>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add channels (set union).
    ///
    /// Returns the channels that were newly added, in registry order.
    pub fn add(&self, channels: &[Channel]) -> Vec<Channel> {
        let mut set = self.channels.write();
        channels
            .iter()
            .copied()
            .filter(|channel| set.insert(*channel))
            .collect()
    }

    /// Remove channels (set difference).
    ///
    /// Returns the channels that were actually removed.
    pub fn remove(&self, channels: &[Channel]) -> Vec<Channel> {
        let mut set = self.channels.write();
        channels
            .iter()
            .copied()
            .filter(|channel| set.remove(channel))
            .collect()
    }

    /// All active channels, in a deterministic order.
    #[must_use]
    pub fn active(&self) -> Vec<Channel> {
        self.channels.read().iter().copied().collect()
    }

    /// Whether the channel is currently wanted.
    #[must_use]
    pub fn contains(&self, channel: Channel) -> bool {
        self.channels.read().contains(&channel)
    }

    /// Whether no channels are wanted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_returns_new_channels_only() {
        let registry = SubscriptionRegistry::new();

        let added = registry.add(&[Channel::Prices, Channel::Yield]);
        assert_eq!(added, vec![Channel::Prices, Channel::Yield]);

        let added = registry.add(&[Channel::Prices, Channel::Arbitrage]);
        assert_eq!(added, vec![Channel::Arbitrage]);
    }

    #[test]
    fn no_channel_appears_twice() {
        let registry = SubscriptionRegistry::new();
        registry.add(&[Channel::Prices, Channel::Prices]);
        registry.add(&[Channel::Prices]);

        assert_eq!(registry.active(), vec![Channel::Prices]);
    }

    #[test]
    fn remove_returns_removed_channels_only() {
        let registry = SubscriptionRegistry::new();
        registry.add(&[Channel::Prices]);

        let removed = registry.remove(&[Channel::Prices, Channel::Yield]);
        assert_eq!(removed, vec![Channel::Prices]);
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_unknown_channel_is_noop() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.remove(&[Channel::Arbitrage]).is_empty());
    }

    #[test]
    fn empty_input_is_noop() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.add(&[]).is_empty());
        assert!(registry.remove(&[]).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn active_order_is_deterministic() {
        let registry = SubscriptionRegistry::new();
        registry.add(&[Channel::Yield, Channel::Prices, Channel::Arbitrage]);

        assert_eq!(
            registry.active(),
            vec![Channel::Prices, Channel::Arbitrage, Channel::Yield]
        );
    }

    #[test]
    fn contains_tracks_membership() {
        let registry = SubscriptionRegistry::new();
        assert!(!registry.contains(Channel::Prices));

        registry.add(&[Channel::Prices]);
        assert!(registry.contains(Channel::Prices));

        registry.remove(&[Channel::Prices]);
        assert!(!registry.contains(Channel::Prices));
    }
}
