//! Identity conversion errors

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Missing mandatory object {name} (0x{id:02X})")]
    MissingObject { id: u8, name: &'static str },

    #[error("Object 0x{id:02X} is not valid UTF-8: {source}")]
    InvalidUtf8 {
        id: u8,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl Error {
    /// Id of the object the error refers to
    pub fn object_id(&self) -> u8 {
        match self {
            Self::MissingObject { id, .. } | Self::InvalidUtf8 { id, .. } => *id,
        }
    }
}
