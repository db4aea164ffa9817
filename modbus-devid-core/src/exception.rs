//! Modbus exception responses

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::constants::{EXCEPTION_FLAG, FUNCTION_CODE};
use crate::error::{Error, Result};

/// Exception codes used by Read Device Identification
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExceptionCode {
    /// Function or MEI type not supported
    IllegalFunction = 0x01,

    /// Object id not available for individual access
    IllegalDataAddress = 0x02,

    /// Invalid read device id code or malformed request
    IllegalDataValue = 0x03,

    /// Unrecoverable server error
    ServerDeviceFailure = 0x04,
}

impl ExceptionCode {
    /// Get exception name
    pub fn name(self) -> &'static str {
        match self {
            Self::IllegalFunction => "ILLEGAL_FUNCTION",
            Self::IllegalDataAddress => "ILLEGAL_DATA_ADDRESS",
            Self::IllegalDataValue => "ILLEGAL_DATA_VALUE",
            Self::ServerDeviceFailure => "SERVER_DEVICE_FAILURE",
        }
    }

    /// Encode an exception response PDU for `function`
    pub fn encode(self, function: u8) -> BytesMut {
        let mut buf = BytesMut::with_capacity(2);
        buf.put_u8(function | EXCEPTION_FLAG);
        buf.put_u8(self.into());
        buf
    }

    /// Decode an exception response to the device identification function
    ///
    /// Returns `None` when the PDU is not an exception response.
    pub fn decode(pdu: &[u8]) -> Option<Result<Self>> {
        match pdu {
            [function, code, ..] if *function == FUNCTION_CODE | EXCEPTION_FLAG => {
                Some(Self::try_from(*code))
            }
            _ => None,
        }
    }
}

impl From<ExceptionCode> for u8 {
    fn from(code: ExceptionCode) -> u8 {
        code as u8
    }
}

impl TryFrom<u8> for ExceptionCode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Self::IllegalFunction),
            0x02 => Ok(Self::IllegalDataAddress),
            0x03 => Ok(Self::IllegalDataValue),
            0x04 => Ok(Self::ServerDeviceFailure),
            _ => Err(Error::UnknownExceptionCode(value)),
        }
    }
}

impl fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}
