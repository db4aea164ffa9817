//! Read device id codes and category membership
//!
//! The read code of a request selects which objects are eligible for the
//! response. Membership is a pure function of the object id:
//!
//! ```text
//! ┌──────┬──────────┬───────────────────────┐
//! │ Code │ Category │ Eligible ids          │
//! ├──────┼──────────┼───────────────────────┤
//! │  1   │ Basic    │ 0x00..=0x03           │
//! │  2   │ Regular  │ 0x00..=0x7F           │
//! │  3   │ Extended │ 0x00..=0xFF           │
//! │  4   │ Object   │ one id, any value     │
//! └──────┴──────────┴───────────────────────┘
//! ```

use std::fmt;

use crate::constants::{BASIC_OBJECT_LIMIT, REGULAR_OBJECT_LIMIT};
use crate::error::{Error, Result};

/// Read device id code
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ReadDeviceIdCode {
    /// Mandatory objects (vendor name, product code, revision)
    Basic = 1,

    /// Basic plus optional standard objects
    Regular = 2,

    /// Regular plus private objects
    Extended = 3,

    /// One specific object
    Object = 4,
}

impl ReadDeviceIdCode {
    /// Check if `id` belongs to this category
    ///
    /// # Examples
    ///
    /// ```
    /// use modbus_devid_core::ReadDeviceIdCode;
    ///
    /// assert!(ReadDeviceIdCode::Basic.contains(0x03));
    /// assert!(!ReadDeviceIdCode::Regular.contains(0x80));
    /// assert!(ReadDeviceIdCode::Extended.contains(0xFF));
    /// ```
    pub fn contains(self, id: u8) -> bool {
        match self {
            Self::Basic => id < BASIC_OBJECT_LIMIT,
            Self::Regular => id < REGULAR_OBJECT_LIMIT,
            Self::Extended | Self::Object => true,
        }
    }

    /// Check if this code streams a category rather than one object
    pub fn is_stream(self) -> bool {
        !matches!(self, Self::Object)
    }

    /// Get code name
    pub fn name(self) -> &'static str {
        match self {
            Self::Basic => "BASIC",
            Self::Regular => "REGULAR",
            Self::Extended => "EXTENDED",
            Self::Object => "OBJECT",
        }
    }
}

impl From<ReadDeviceIdCode> for u8 {
    fn from(code: ReadDeviceIdCode) -> u8 {
        code as u8
    }
}

impl TryFrom<u8> for ReadDeviceIdCode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Basic),
            2 => Ok(Self::Regular),
            3 => Ok(Self::Extended),
            4 => Ok(Self::Object),
            _ => Err(Error::InvalidReadCode(value)),
        }
    }
}

impl fmt::Display for ReadDeviceIdCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u8)
    }
}

/// Check if the raw read code is one of the four defined codes
pub fn validate_read_code(code: u8) -> bool {
    ReadDeviceIdCode::try_from(code).is_ok()
}

/// Check category membership for a raw read code
///
/// Undefined codes match nothing.
pub fn in_category(code: u8, id: u8) -> bool {
    ReadDeviceIdCode::try_from(code)
        .map(|code| code.contains(id))
        .unwrap_or(false)
}
