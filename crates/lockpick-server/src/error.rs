use thiserror::Error;

/// Top-level gateway errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("transport error: {0}")]
    Transport(#[from] lockpick_transport::TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] lockpick_protocol::ProtocolError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
