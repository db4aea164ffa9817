//! # modbus-devid-core
//!
//! Core implementation of Modbus Read Device Identification
//! (function 0x2B, MEI type 0x0E).
//!
//! This crate provides the protocol primitives:
//! - Ordered identification object store
//! - Response building with segmentation
//! - Response parsing into a store
//! - Read codes, category membership and request fields
//! - Exception codes

pub mod category;
pub mod constants;
pub mod error;
pub mod exception;
pub mod object;
pub mod request;
pub mod response;
pub mod shared;
pub mod store;

pub use category::{in_category, validate_read_code, ReadDeviceIdCode};
pub use error::{Error, Result};
pub use exception::ExceptionCode;
pub use object::{DeviceIdObject, ObjectId};
pub use request::Request;
pub use response::{
    build_response, parse_response, BuildStatus, ParsedResponse, ResponseBuilder, ResponseHeader,
};
pub use shared::SharedObjectStore;
pub use store::ObjectStore;

/// Check if `id` names an object in `store`
pub fn validate_object_id(store: &ObjectStore, id: u8) -> bool {
    store.validate_id(id)
}
