//! Push-channel infrastructure: wire messages, codec, WebSocket
//! transport, connection manager, and the message router.

pub mod client;
pub mod codec;
pub mod messages;
pub mod router;
pub mod transport;

pub use client::{ClientConfig, StreamClient, StreamHandle};
pub use codec::{CodecError, JsonCodec};
pub use messages::{Envelope, OutboundRequest, StreamMessage};
pub use router::{MessageRouter, HIGH_VALUE_PROFIT_PERCENT};
pub use transport::WsConnector;
