//! Transport errors

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Read timeout")]
    ReadTimeout,

    #[error("Connection closed by remote")]
    ConnectionClosed,

    #[error("PDU too large: {size} bytes (max: {max} bytes)")]
    PduTooLarge {
        size: usize,
        max: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if a retry might succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ReadTimeout | Self::Io(_))
    }
}
