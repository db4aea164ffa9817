//! High-level error types

use modbus_devid_core::ExceptionCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] modbus_devid_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] modbus_devid_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] modbus_devid_types::Error),

    #[error("Server returned exception: {0}")]
    Exception(ExceptionCode),

    #[error("Server made no progress: more follows from object 0x{next_object_id:02X} with no objects")]
    Stalled {
        next_object_id: u8,
    },

    #[error("Identification still incomplete after {requests} requests")]
    TooManyRequests {
        requests: usize,
    },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}
