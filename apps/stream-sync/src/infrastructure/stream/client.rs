//! Stream Client
//!
//! Connection manager for the push channel. Owns the full connection
//! lifecycle: connect, replay subscriptions, pump frames through the
//! codec into the router, heartbeat, and reconnect after a fixed
//! delay when the connection drops.
//!
//! `run` consumes the client, so a second concurrent connection
//! attempt for the same client cannot be expressed. Callers interact
//! through the cloneable [`StreamHandle`] instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{Frame, StreamConnector, StreamTransport};
use crate::domain::records::{Channel, ConnectionState};
use crate::domain::subscription::SubscriptionRegistry;
use crate::infrastructure::store::MarketStore;

use super::codec::JsonCodec;
use super::messages::OutboundRequest;
use super::router::MessageRouter;

/// Connection lifecycle settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fixed wait between reconnect attempts.
    pub reconnect_delay: Duration,
    /// Application-level ping cadence while connected.
    pub heartbeat_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(5000),
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

/// Commands forwarded to the live connection.
#[derive(Debug)]
enum Command {
    Send(OutboundRequest),
}

/// Why a live connection ended.
enum SessionEnd {
    Cancelled,
    Closed,
}

/// Drives the push channel. Created together with its handle via
/// [`StreamClient::new`] and consumed by [`StreamClient::run`].
pub struct StreamClient {
    connector: Arc<dyn StreamConnector>,
    router: MessageRouter,
    codec: JsonCodec,
    registry: Arc<SubscriptionRegistry>,
    store: Arc<MarketStore>,
    config: ClientConfig,
    cancel: CancellationToken,
    command_rx: mpsc::Receiver<Command>,
}

/// Cloneable control surface for a running [`StreamClient`].
#[derive(Clone)]
pub struct StreamHandle {
    registry: Arc<SubscriptionRegistry>,
    store: Arc<MarketStore>,
    cancel: CancellationToken,
    command_tx: mpsc::Sender<Command>,
}

impl StreamClient {
    /// Build a client and its control handle.
    #[must_use]
    pub fn new(
        connector: Arc<dyn StreamConnector>,
        router: MessageRouter,
        registry: Arc<SubscriptionRegistry>,
        store: Arc<MarketStore>,
        config: ClientConfig,
        cancel: CancellationToken,
    ) -> (Self, StreamHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let handle = StreamHandle {
            registry: registry.clone(),
            store: store.clone(),
            cancel: cancel.clone(),
            command_tx,
        };

        let client = Self {
            connector,
            router,
            codec: JsonCodec::new(),
            registry,
            store,
            config,
            cancel,
            command_rx,
        };

        (client, handle)
    }

    /// Run the connection lifecycle until cancelled.
    ///
    /// Each pass connects, drives the session to its end, records the
    /// drop, then waits out the fixed reconnect delay. At most one
    /// reconnect is ever pending.
    pub async fn run(mut self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            self.store.set_state(ConnectionState::Connecting);

            match self.connector.connect().await {
                Ok(transport) => {
                    let end = self.drive(transport).await;
                    self.store.set_state(ConnectionState::Disconnected);
                    if matches!(end, SessionEnd::Cancelled) {
                        break;
                    }
                    tracing::warn!(
                        delay_ms = self.config.reconnect_delay.as_millis(),
                        "Stream connection lost, reconnecting"
                    );
                }
                Err(e) => {
                    self.store.set_state(ConnectionState::Disconnected);
                    tracing::warn!(
                        error = %e,
                        delay_ms = self.config.reconnect_delay.as_millis(),
                        "Stream connect failed, retrying"
                    );
                }
            }

            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }

        self.store.set_state(ConnectionState::Disconnected);
        tracing::info!("Stream client stopped");
    }

    /// Drive one live connection until it ends.
    async fn drive(&mut self, mut transport: Box<dyn StreamTransport>) -> SessionEnd {
        self.store.set_state(ConnectionState::Connected);
        tracing::info!("Stream connected");

        // Replay the desired channel set as a single request.
        let active = self.registry.active();
        if !active.is_empty() {
            tracing::info!(channels = ?active, "Replaying subscriptions");
            if !self.send(&mut *transport, &OutboundRequest::subscribe(active)).await {
                return SessionEnd::Closed;
            }
        }

        let mut heartbeat = tokio::time::interval_at(
            tokio::time::Instant::now() + self.config.heartbeat_interval,
            self.config.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut commands_open = true;

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    transport.close().await;
                    return SessionEnd::Cancelled;
                }
                _ = heartbeat.tick() => {
                    if !self.send(&mut *transport, &OutboundRequest::Ping).await {
                        return SessionEnd::Closed;
                    }
                }
                command = self.command_rx.recv(), if commands_open => {
                    match command {
                        Some(Command::Send(request)) => {
                            if !self.send(&mut *transport, &request).await {
                                return SessionEnd::Closed;
                            }
                        }
                        None => {
                            // All handles dropped; nothing left to forward.
                            commands_open = false;
                        }
                    }
                }
                frame = transport.recv() => {
                    match frame {
                        Some(Ok(Frame::Text(text))) => {
                            match self.codec.decode(&text) {
                                Ok(message) => self.router.route(message),
                                Err(e) => {
                                    tracing::debug!(error = %e, "Dropping undecodable frame");
                                }
                            }
                        }
                        Some(Ok(Frame::Ping(data))) => {
                            if transport.pong(data).await.is_err() {
                                return SessionEnd::Closed;
                            }
                        }
                        Some(Ok(Frame::Pong(_))) => {}
                        Some(Ok(Frame::Close)) => {
                            tracing::info!("Server sent close frame");
                            return SessionEnd::Closed;
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Stream receive error");
                            return SessionEnd::Closed;
                        }
                        None => {
                            tracing::info!("Stream ended");
                            return SessionEnd::Closed;
                        }
                    }
                }
            }
        }
    }

    /// Encode and send one request. Returns false when the transport
    /// is gone, which ends the session like a close.
    async fn send(
        &self,
        transport: &mut (dyn StreamTransport),
        request: &OutboundRequest,
    ) -> bool {
        let json = match self.codec.encode(request) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode request");
                return true;
            }
        };
        match transport.send(json).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Stream send failed");
                false
            }
        }
    }
}

impl StreamHandle {
    /// Register interest in the given channels.
    ///
    /// The registry is updated first, so the desired set survives a
    /// drop even when the wire request never goes out. Channels that
    /// were already active are not re-requested; an empty or fully
    /// redundant call sends nothing.
    pub async fn subscribe(&self, channels: &[Channel]) {
        let added = self.registry.add(channels);
        if added.is_empty() {
            return;
        }
        self.forward(OutboundRequest::subscribe(added)).await;
    }

    /// Drop interest in the given channels.
    ///
    /// Mirror of [`subscribe`](Self::subscribe): registry first, wire
    /// request only for channels that were actually active.
    pub async fn unsubscribe(&self, channels: &[Channel]) {
        let removed = self.registry.remove(channels);
        if removed.is_empty() {
            return;
        }
        self.forward(OutboundRequest::unsubscribe(removed)).await;
    }

    /// Stop the client for good. Idempotent; no reconnect follows.
    pub fn disconnect(&self) {
        self.cancel.cancel();
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.store.state()
    }

    /// Channels currently registered, sorted.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Channel> {
        self.registry.active()
    }

    async fn forward(&self, request: OutboundRequest) {
        if self.store.state() != ConnectionState::Connected {
            // Registry already holds the desired set; the replay on
            // the next connect covers it.
            tracing::debug!(?request, "Not connected, deferring to replay");
            return;
        }
        if self.command_tx.send(Command::Send(request)).await.is_err() {
            tracing::debug!("Stream client already stopped");
        }
    }
}
