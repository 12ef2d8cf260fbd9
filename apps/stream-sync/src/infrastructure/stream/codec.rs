//! Stream Codec
//!
//! JSON encoding and decoding for the push channel. The server sends
//! one envelope object per text frame; outbound requests are single
//! objects as well.

use super::messages::{Envelope, OutboundRequest, StreamMessage};

/// Codec errors.
///
/// A decode error means one frame was unusable; the client logs it
/// and drops the frame, never the connection.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON encoding/decoding failed.
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame was valid JSON but not an envelope object.
    #[error("invalid message format: {0}")]
    InvalidFormat(String),
}

/// JSON codec for the push channel.
#[derive(Debug, Default, Clone)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create a new JSON codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode one text frame into a classified message.
    ///
    /// # Errors
    ///
    /// Returns an error when the frame is not a JSON envelope object;
    /// the caller drops the frame.
    pub fn decode(&self, text: &str) -> Result<StreamMessage, CodecError> {
        let trimmed = text.trim();
        if !trimmed.starts_with('{') {
            let preview: String = trimmed.chars().take(50).collect();
            return Err(CodecError::InvalidFormat(format!(
                "expected JSON object, got: {preview}..."
            )));
        }

        let envelope: Envelope = serde_json::from_str(trimmed)?;
        Ok(StreamMessage::from(envelope))
    }

    /// Encode an outbound request to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self, request: &OutboundRequest) -> Result<String, CodecError> {
        Ok(serde_json::to_string(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_welcome_notice() {
        let codec = JsonCodec::new();
        let message = codec
            .decode(r#"{"type":"connected","message":"Connected to DeFi Analytics WebSocket"}"#)
            .unwrap();

        match message {
            StreamMessage::Connected { message } => {
                assert_eq!(
                    message.as_deref(),
                    Some("Connected to DeFi Analytics WebSocket")
                );
            }
            other => panic!("expected Connected, got {other:?}"),
        }
    }

    #[test]
    fn decode_rejects_non_object_frames() {
        let codec = JsonCodec::new();
        assert!(codec.decode("[1,2,3]").is_err());
        assert!(codec.decode("not json at all").is_err());
    }

    #[test]
    fn decode_rejects_envelope_without_type() {
        let codec = JsonCodec::new();
        assert!(codec.decode(r#"{"data":{}}"#).is_err());
    }

    #[test]
    fn decode_unknown_type_is_not_an_error() {
        let codec = JsonCodec::new();
        let message = codec.decode(r#"{"type":"mystery"}"#).unwrap();
        assert!(matches!(message, StreamMessage::Unknown { .. }));
    }

    #[test]
    fn encode_round_trips_requests() {
        use crate::domain::records::Channel;

        let codec = JsonCodec::new();
        let request = OutboundRequest::subscribe(vec![Channel::Prices]);

        let json = codec.encode(&request).unwrap();
        let back: OutboundRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(back, request);
    }
}
