//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire messages.
///
/// Each crate in rallyd defines its own error enum; a `ProtocolError`
/// always means the problem is in serialization or message shape, not
/// in networking or session management.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into JSON bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed. Common causes: malformed JSON, a missing
    /// `type` tag, missing required fields, or wrong data types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates a protocol rule — e.g. an empty
    /// player name, or a slot number that isn't 1 or 2.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
