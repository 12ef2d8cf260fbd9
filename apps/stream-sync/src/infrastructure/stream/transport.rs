//! WebSocket Transport Adapter
//!
//! Production implementation of the push-channel ports on top of
//! `tokio-tungstenite`.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::application::ports::{Frame, StreamConnector, StreamTransport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections to the backend push endpoint.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    /// Create a connector for the given `ws://` or `wss://` URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl StreamConnector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn StreamTransport>, TransportError> {
        tracing::info!(url = %self.url, "Connecting to stream");

        let (ws_stream, _response) = tokio_tungstenite::connect_async(&self.url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let (write, read) = ws_stream.split();
        Ok(Box::new(WsTransport { write, read }))
    }
}

/// One live WebSocket connection.
pub struct WsTransport {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
}

#[async_trait]
impl StreamTransport for WsTransport {
    async fn send(&mut self, text: String) -> Result<(), TransportError> {
        self.write
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<Frame, TransportError>> {
        loop {
            return match self.read.next().await? {
                Ok(Message::Text(text)) => Some(Ok(Frame::Text(text.to_string()))),
                Ok(Message::Ping(data)) => Some(Ok(Frame::Ping(data.to_vec()))),
                Ok(Message::Pong(data)) => Some(Ok(Frame::Pong(data.to_vec()))),
                Ok(Message::Close(_)) => Some(Ok(Frame::Close)),
                // Binary and raw frames are not part of this protocol.
                Ok(_) => continue,
                Err(e) => Some(Err(TransportError::Recv(e.to_string()))),
            };
        }
    }

    async fn pong(&mut self, data: Vec<u8>) -> Result<(), TransportError> {
        self.write
            .send(Message::Pong(data.into()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.write.send(Message::Close(None)).await;
        let _ = self.write.close().await;
    }
}
