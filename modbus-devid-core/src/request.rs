//! Read Device Identification request
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┐
//! │ Function │ MEI type │ ReadCode │ ObjectId │
//! │  0x2B    │  0x0E    │  1..=4   │  1 byte  │
//! └──────────┴──────────┴──────────┴──────────┘
//! ```

use std::fmt;

use bytes::{BufMut, BytesMut};

use crate::category::ReadDeviceIdCode;
use crate::constants::{FUNCTION_CODE, MEI_DEVICE_IDENTIFICATION, REQUEST_LEN};
use crate::error::{Error, Result};

/// MEI type of a request PDU (offset 1)
pub fn mei_type(pdu: &[u8]) -> Option<u8> {
    pdu.get(1).copied()
}

/// Read device id code of a request PDU (offset 2)
pub fn read_device_id_code(pdu: &[u8]) -> Option<u8> {
    pdu.get(2).copied()
}

/// Object id of a request PDU (offset 3)
pub fn object_id(pdu: &[u8]) -> Option<u8> {
    pdu.get(3).copied()
}

/// Read Device Identification request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub read_code: ReadDeviceIdCode,
    pub object_id: u8,
}

impl Request {
    pub fn new(read_code: ReadDeviceIdCode, object_id: u8) -> Self {
        Self {
            read_code,
            object_id,
        }
    }

    /// Encode the full request PDU, function code included
    ///
    /// # Examples
    ///
    /// ```
    /// use modbus_devid_core::{ReadDeviceIdCode, Request};
    ///
    /// let pdu = Request::new(ReadDeviceIdCode::Basic, 0).encode();
    /// assert_eq!(&pdu[..], &[0x2B, 0x0E, 0x01, 0x00]);
    /// ```
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(REQUEST_LEN);
        buf.put_u8(FUNCTION_CODE);
        buf.put_u8(MEI_DEVICE_IDENTIFICATION);
        buf.put_u8(self.read_code.into());
        buf.put_u8(self.object_id);
        buf
    }

    /// Decode a request PDU
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - PDU is shorter than 4 bytes
    /// - function code is not 0x2B
    /// - MEI type is not 0x0E
    /// - read code is not 1..=4
    pub fn decode(pdu: &[u8]) -> Result<Self> {
        if pdu.len() < REQUEST_LEN {
            return Err(Error::PduTooShort {
                expected: REQUEST_LEN,
                actual: pdu.len(),
            });
        }

        if pdu[0] != FUNCTION_CODE {
            return Err(Error::InvalidFunctionCode(pdu[0]));
        }

        let mei = pdu[1];
        if mei != MEI_DEVICE_IDENTIFICATION {
            return Err(Error::InvalidMeiType(mei));
        }

        Ok(Self {
            read_code: ReadDeviceIdCode::try_from(pdu[2])?,
            object_id: pdu[3],
        })
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ReadDeviceId[{}](object=0x{:02X})",
            self.read_code, self.object_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_extraction() {
        let pdu = [0x2B, 0x0E, 0x03, 0x80];
        assert_eq!(mei_type(&pdu), Some(0x0E));
        assert_eq!(read_device_id_code(&pdu), Some(0x03));
        assert_eq!(object_id(&pdu), Some(0x80));
    }

    #[test]
    fn test_field_extraction_short_pdu() {
        let pdu = [0x2B, 0x0E];
        assert_eq!(mei_type(&pdu), Some(0x0E));
        assert_eq!(read_device_id_code(&pdu), None);
        assert_eq!(object_id(&pdu), None);
    }

    #[test]
    fn test_request_encode_decode() {
        let request = Request::new(ReadDeviceIdCode::Extended, 0x80);
        let decoded = Request::decode(&request.encode()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_request_too_short() {
        let result = Request::decode(&[0x2B, 0x0E, 0x01]);
        assert_eq!(result, Err(Error::PduTooShort { expected: 4, actual: 3 }));
    }

    #[test]
    fn test_request_wrong_function() {
        let result = Request::decode(&[0x03, 0x0E, 0x01, 0x00]);
        assert_eq!(result, Err(Error::InvalidFunctionCode(0x03)));
    }

    #[test]
    fn test_request_wrong_mei_type() {
        let result = Request::decode(&[0x2B, 0x0D, 0x01, 0x00]);
        assert_eq!(result, Err(Error::InvalidMeiType(0x0D)));
    }

    #[test]
    fn test_request_invalid_read_code() {
        let result = Request::decode(&[0x2B, 0x0E, 0x05, 0x00]);
        assert_eq!(result, Err(Error::InvalidReadCode(0x05)));
    }

    #[test]
    fn test_request_display() {
        let request = Request::new(ReadDeviceIdCode::Object, 0x04);
        assert_eq!(request.to_string(), "ReadDeviceId[OBJECT(4)](object=0x04)");
    }
}
