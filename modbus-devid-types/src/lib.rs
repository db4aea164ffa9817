//! Type definitions for modbus-devid

pub mod error;
pub mod identity;

pub use error::{Error, Result};
pub use identity::DeviceIdentity;
