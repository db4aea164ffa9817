//! Identification objects

use std::fmt;

use crate::constants::{MAX_OBJECT_DATA_LEN, OBJECT_OVERHEAD};
use crate::error::{Error, Result};

/// Well-known object ids
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ObjectId {
    // Basic
    VendorName = 0x00,
    ProductCode = 0x01,
    MajorMinorRevision = 0x02,

    // Regular
    VendorUrl = 0x03,
    ProductName = 0x04,
    ModelName = 0x05,
    UserApplicationName = 0x06,
}

impl ObjectId {
    /// Get object name
    pub fn name(self) -> &'static str {
        match self {
            Self::VendorName => "VendorName",
            Self::ProductCode => "ProductCode",
            Self::MajorMinorRevision => "MajorMinorRevision",
            Self::VendorUrl => "VendorUrl",
            Self::ProductName => "ProductName",
            Self::ModelName => "ModelName",
            Self::UserApplicationName => "UserApplicationName",
        }
    }
}

impl From<ObjectId> for u8 {
    fn from(id: ObjectId) -> u8 {
        id as u8
    }
}

impl TryFrom<u8> for ObjectId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::VendorName),
            0x01 => Ok(Self::ProductCode),
            0x02 => Ok(Self::MajorMinorRevision),
            0x03 => Ok(Self::VendorUrl),
            0x04 => Ok(Self::ProductName),
            0x05 => Ok(Self::ModelName),
            0x06 => Ok(Self::UserApplicationName),
            _ => Err(Error::UnknownObjectId(value)),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

/// Identification object
///
/// The data buffer is owned by the object and opaque to the protocol.
#[derive(Clone, PartialEq, Eq)]
pub struct DeviceIdObject {
    id: u8,
    data: Vec<u8>,
}

impl DeviceIdObject {
    /// Copy `data` into a new object
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `data` is longer than 255 bytes
    /// - the data buffer cannot be allocated
    pub fn new(id: u8, data: &[u8]) -> Result<Self> {
        if data.len() > MAX_OBJECT_DATA_LEN {
            return Err(Error::DataTooLong {
                len: data.len(),
                max: MAX_OBJECT_DATA_LEN,
            });
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(data.len())
            .map_err(|_| Error::AllocationFailure {
                id,
                requested: data.len(),
            })?;
        buf.extend_from_slice(data);

        Ok(Self { id, data: buf })
    }

    /// Object id
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Object data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Data length as carried in the length byte
    pub fn len(&self) -> u8 {
        // Bounded by MAX_OBJECT_DATA_LEN in `new`
        self.data.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes this object occupies in a response
    pub fn encoded_len(&self) -> usize {
        OBJECT_OVERHEAD + self.data.len()
    }

    /// Well-known id, if any
    pub fn well_known(&self) -> Option<ObjectId> {
        ObjectId::try_from(self.id).ok()
    }
}

impl fmt::Debug for DeviceIdObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceIdObject")
            .field("id", &format!("0x{:02X}", self.id))
            .field("len", &self.data.len())
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_object_new() {
        let obj = DeviceIdObject::new(0x04, b"Pump").unwrap();
        assert_eq!(obj.id(), 0x04);
        assert_eq!(obj.data(), b"Pump");
        assert_eq!(obj.len(), 4);
        assert_eq!(obj.encoded_len(), 6);
        assert_eq!(obj.well_known(), Some(ObjectId::ProductName));
    }

    #[test]
    fn test_object_empty_data() {
        let obj = DeviceIdObject::new(0x80, &[]).unwrap();
        assert!(obj.is_empty());
        assert_eq!(obj.encoded_len(), 2);
        assert_eq!(obj.well_known(), None);
    }

    #[test]
    fn test_object_max_length() {
        assert!(DeviceIdObject::new(1, &[0xAB; 255]).is_ok());

        let result = DeviceIdObject::new(1, &[0xAB; 256]);
        assert_eq!(result, Err(Error::DataTooLong { len: 256, max: 255 }));
    }

    #[test]
    fn test_object_id_names() {
        assert_eq!(ObjectId::try_from(0x02).unwrap(), ObjectId::MajorMinorRevision);
        assert_eq!(ObjectId::VendorUrl.to_string(), "VendorUrl(0x03)");
        assert!(ObjectId::try_from(0x07).is_err());
    }
}
