//! Error types for modbus-devid-core

/// Result type alias for device identification operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Object id already present in the store
    #[error("Duplicate object id: 0x{0:02X}")]
    DuplicateId(u8),

    /// Buffer for object data could not be reserved
    #[error("Allocation failed for object 0x{id:02X} ({requested} bytes)")]
    AllocationFailure {
        id: u8,
        requested: usize,
    },

    /// Object data does not fit the 8-bit length field
    #[error("Object data too long: {len} bytes (max: {max} bytes)")]
    DataTooLong {
        len: usize,
        max: usize,
    },

    /// Object id not present in the store
    #[error("Unknown object id: 0x{0:02X}")]
    UnknownObjectId(u8),

    /// Read device id code outside 1..=4
    #[error("Invalid read device id code: {0}")]
    InvalidReadCode(u8),

    /// Unexpected function code
    #[error("Invalid function code: 0x{0:02X}")]
    InvalidFunctionCode(u8),

    /// MEI type other than device identification
    #[error("Invalid MEI type: 0x{0:02X}")]
    InvalidMeiType(u8),

    /// Unknown Modbus exception code
    #[error("Unknown exception code: 0x{0:02X}")]
    UnknownExceptionCode(u8),

    /// PDU is too short to hold its fixed fields
    #[error("PDU too short: expected at least {expected} bytes, got {actual} bytes")]
    PduTooShort {
        expected: usize,
        actual: usize,
    },

    /// Advertised object count or length exceeds the buffer
    #[error("Malformed response: object {index} needs {needed} bytes, {available} available")]
    MalformedResponse {
        index: usize,
        needed: usize,
        available: usize,
    },
}

impl Error {
    /// Check if the error leaves already decoded objects usable
    ///
    /// Duplicate ids are reported but do not invalidate the store.
    pub fn is_partial_success(&self) -> bool {
        matches!(self, Self::DuplicateId(_))
    }

    /// Check if the error comes from bytes received off the wire
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::PduTooShort { .. }
                | Self::MalformedResponse { .. }
                | Self::InvalidFunctionCode(_)
                | Self::InvalidMeiType(_)
                | Self::UnknownExceptionCode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::DuplicateId(1).is_partial_success());
        assert!(!Error::DuplicateId(1).is_malformed());
        assert!(Error::MalformedResponse { index: 0, needed: 4, available: 1 }.is_malformed());
        assert!(!Error::InvalidReadCode(9).is_partial_success());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::DuplicateId(0x81).to_string(), "Duplicate object id: 0x81");
        assert_eq!(
            Error::PduTooShort { expected: 6, actual: 2 }.to_string(),
            "PDU too short: expected at least 6 bytes, got 2 bytes"
        );
    }
}
