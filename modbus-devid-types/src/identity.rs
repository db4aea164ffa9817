//! Device identity structures

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

const VENDOR_NAME: u8 = 0x00;
const PRODUCT_CODE: u8 = 0x01;
const MAJOR_MINOR_REVISION: u8 = 0x02;
const VENDOR_URL: u8 = 0x03;
const PRODUCT_NAME: u8 = 0x04;
const MODEL_NAME: u8 = 0x05;
const USER_APPLICATION_NAME: u8 = 0x06;

/// First id of the private (extended) objects
const FIRST_PRIVATE_ID: u8 = 0x80;

/// Device identity
///
/// Typed view of the identification objects a device reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Vendor name (0x00)
    pub vendor_name: String,

    /// Product code (0x01)
    pub product_code: String,

    /// Major/minor revision (0x02)
    pub revision: String,

    /// Vendor URL (0x03)
    pub vendor_url: Option<String>,

    /// Product name (0x04)
    pub product_name: Option<String>,

    /// Model name (0x05)
    pub model_name: Option<String>,

    /// User application name (0x06)
    pub user_application_name: Option<String>,

    /// Private objects (0x80 and above), raw bytes
    pub private: BTreeMap<u8, Vec<u8>>,
}

impl DeviceIdentity {
    pub fn new(
        vendor_name: impl Into<String>,
        product_code: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            vendor_name: vendor_name.into(),
            product_code: product_code.into(),
            revision: revision.into(),
            ..Self::default()
        }
    }

    /// Build from `(id, data)` pairs
    ///
    /// Standard objects must be UTF-8; a trailing NUL is dropped. Reserved
    /// ids (0x07..=0x7F) are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if a basic object is missing or a standard object is
    /// not valid UTF-8.
    pub fn from_objects<'a, I>(objects: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, &'a [u8])>,
    {
        let mut vendor_name = None;
        let mut product_code = None;
        let mut revision = None;
        let mut identity = Self::default();

        for (id, data) in objects {
            match id {
                VENDOR_NAME => vendor_name = Some(decode_string(id, data)?),
                PRODUCT_CODE => product_code = Some(decode_string(id, data)?),
                MAJOR_MINOR_REVISION => revision = Some(decode_string(id, data)?),
                VENDOR_URL => identity.vendor_url = Some(decode_string(id, data)?),
                PRODUCT_NAME => identity.product_name = Some(decode_string(id, data)?),
                MODEL_NAME => identity.model_name = Some(decode_string(id, data)?),
                USER_APPLICATION_NAME => {
                    identity.user_application_name = Some(decode_string(id, data)?)
                }
                FIRST_PRIVATE_ID..=u8::MAX => {
                    identity.private.insert(id, data.to_vec());
                }
                _ => {}
            }
        }

        identity.vendor_name = required(vendor_name, VENDOR_NAME, "VendorName")?;
        identity.product_code = required(product_code, PRODUCT_CODE, "ProductCode")?;
        identity.revision = required(revision, MAJOR_MINOR_REVISION, "MajorMinorRevision")?;

        Ok(identity)
    }

    /// Flatten into `(id, data)` pairs in ascending id order
    pub fn to_objects(&self) -> Vec<(u8, Vec<u8>)> {
        let standard = [
            (VENDOR_NAME, Some(&self.vendor_name)),
            (PRODUCT_CODE, Some(&self.product_code)),
            (MAJOR_MINOR_REVISION, Some(&self.revision)),
            (VENDOR_URL, self.vendor_url.as_ref()),
            (PRODUCT_NAME, self.product_name.as_ref()),
            (MODEL_NAME, self.model_name.as_ref()),
            (USER_APPLICATION_NAME, self.user_application_name.as_ref()),
        ];

        standard
            .into_iter()
            .filter_map(|(id, value)| value.map(|v| (id, v.as_bytes().to_vec())))
            .chain(self.private.iter().map(|(id, data)| (*id, data.clone())))
            .collect()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Device[{} {} rev {}]",
            self.vendor_name, self.product_code, self.revision
        )
    }
}

fn decode_string(id: u8, data: &[u8]) -> Result<String> {
    let data = data.strip_suffix(b"\0").unwrap_or(data);
    String::from_utf8(data.to_vec())
        .map_err(|e| Error::InvalidUtf8 {
            id,
            source: e.utf8_error(),
        })
}

fn required(value: Option<String>, id: u8, name: &'static str) -> Result<String> {
    value.ok_or(Error::MissingObject { id, name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_basic_objects() {
        let objects: [(u8, &[u8]); 3] = [
            (0x00, b"Acme"),
            (0x01, b"PC-100"),
            (0x02, b"v1.2"),
        ];

        let identity = DeviceIdentity::from_objects(objects).unwrap();
        assert_eq!(identity, DeviceIdentity::new("Acme", "PC-100", "v1.2"));
        assert_eq!(identity.to_string(), "Device[Acme PC-100 rev v1.2]");
    }

    #[test]
    fn test_trailing_nul_stripped() {
        let objects: [(u8, &[u8]); 4] = [
            (0x00, b"VendorName:A\0"),
            (0x01, b"ProductCode:B\0"),
            (0x02, b"MajorMinorVersion:C\0"),
            (0x05, b"ModelName:F\0"),
        ];

        let identity = DeviceIdentity::from_objects(objects).unwrap();
        assert_eq!(identity.vendor_name, "VendorName:A");
        assert_eq!(identity.model_name.as_deref(), Some("ModelName:F"));
    }

    #[test]
    fn test_missing_mandatory() {
        let objects: [(u8, &[u8]); 2] = [(0x00, b"Acme"), (0x02, b"v1")];

        let result = DeviceIdentity::from_objects(objects);
        assert_eq!(
            result,
            Err(Error::MissingObject {
                id: 0x01,
                name: "ProductCode"
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let objects: [(u8, &[u8]); 1] = [(0x00, &[0xFF, 0xFE])];
        assert!(matches!(
            DeviceIdentity::from_objects(objects),
            Err(Error::InvalidUtf8 { id: 0x00, .. })
        ));
    }

    #[test]
    fn test_private_objects_kept_raw() {
        let objects: [(u8, &[u8]); 5] = [
            (0x00, b"Acme"),
            (0x01, b"PC-100"),
            (0x02, b"v1"),
            (0x10, b"reserved"),
            (0x80, &[0xDE, 0xAD]),
        ];

        let identity = DeviceIdentity::from_objects(objects).unwrap();
        assert_eq!(identity.private.get(&0x80), Some(&vec![0xDE, 0xAD]));
        assert_eq!(identity.private.len(), 1);
    }

    #[test]
    fn test_to_objects_order() {
        let mut identity = DeviceIdentity::new("Acme", "PC-100", "v1");
        identity.model_name = Some("M1".into());
        identity.private.insert(0x81, vec![1]);

        let ids: Vec<u8> = identity.to_objects().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0x00, 0x01, 0x02, 0x05, 0x81]);

        let objects = identity.to_objects();
        let back =
            DeviceIdentity::from_objects(objects.iter().map(|(id, d)| (*id, d.as_slice())))
                .unwrap();
        assert_eq!(back, identity);
    }
}
