use thiserror::Error;

/// Errors produced while encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A value could not be serialized.
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),

    /// Incoming bytes were malformed or did not match any known
    /// message shape.
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}
