//! Read Device Identification response encoding and decoding
//!
//! # Response Structure
//!
//! The function code (0x2B) is handled by the caller; everything here starts
//! at the MEI type byte.
//!
//! ```text
//! ┌─────────┬──────────┬───────────┬──────────┬──────────┬─────────┬──────────────────────┐
//! │ MEI     │ ReadCode │ Conformity│ More     │ Next ID  │ Count   │ (id, len, data) * N  │
//! │ 1 byte  │ 1 byte   │ 1 byte    │ 1 byte   │ 1 byte   │ 1 byte  │ 2 + len bytes each   │
//! └─────────┴──────────┴───────────┴──────────┴──────────┴─────────┴──────────────────────┘
//! ```
//!
//! When the eligible objects do not fit in one PDU the server sets the more
//! follows flag to 0xFF and reports the id of the first object left out. The
//! client repeats the request from that id until more follows is 0x00.

use bytes::{Buf, BufMut, BytesMut};
use tracing::{debug, trace};

use crate::category::ReadDeviceIdCode;
use crate::constants::{
    offsets, CONFORMITY_LEVEL, FUNCTION_CODE_LEN, MAX_PDU_LENGTH, MEI_DEVICE_IDENTIFICATION,
    MORE_FOLLOWS, NO_MORE_FOLLOWS, OBJECT_OVERHEAD, RESPONSE_HEADER_LEN,
};
use crate::error::{Error, Result};
use crate::object::DeviceIdObject;
use crate::store::ObjectStore;

/// Outcome of building one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStatus {
    /// Bytes written to the buffer (header + objects)
    pub bytes_written: usize,

    /// Objects packed into this response
    pub object_count: u8,

    /// More objects remain for a follow-up request
    pub more_follows: bool,

    /// Id to resume from (0 unless `more_follows`)
    pub next_object_id: u8,
}

/// Response builder
///
/// Packs objects from a store into one response body, segmenting when the
/// eligible objects exceed the PDU size.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use modbus_devid_core::{ObjectStore, ResponseBuilder};
///
/// let mut store = ObjectStore::new();
/// store.insert(0x00, b"Acme").unwrap();
///
/// let mut buf = BytesMut::new();
/// let status = ResponseBuilder::new().build(&store, 1, 0, &mut buf);
///
/// assert_eq!(status.object_count, 1);
/// assert_eq!(status.bytes_written, buf.len());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseBuilder {
    max_pdu_length: usize,
    conformity_level: u8,
}

impl ResponseBuilder {
    /// Create a builder for standard 253-byte PDUs
    pub fn new() -> Self {
        Self {
            max_pdu_length: MAX_PDU_LENGTH,
            conformity_level: CONFORMITY_LEVEL,
        }
    }

    /// Set maximum PDU length, function code included
    ///
    /// Values above the 253-byte Modbus limit are clamped to it, which also
    /// keeps the object count within its single byte.
    pub fn with_max_pdu_length(mut self, max_pdu_length: usize) -> Self {
        self.max_pdu_length = max_pdu_length.min(MAX_PDU_LENGTH);
        self
    }

    /// Set the advertised conformity level
    pub fn with_conformity_level(mut self, conformity_level: u8) -> Self {
        self.conformity_level = conformity_level;
        self
    }

    pub fn max_pdu_length(&self) -> usize {
        self.max_pdu_length
    }

    pub fn conformity_level(&self) -> u8 {
        self.conformity_level
    }

    /// Byte budget a response body must stay below
    ///
    /// An object is only packed while `written + length + 2` stays strictly
    /// below this value, so an object that would exactly fill the remaining
    /// space is deferred to the next response.
    pub fn capacity(&self) -> usize {
        self.max_pdu_length
            .saturating_sub(FUNCTION_CODE_LEN + RESPONSE_HEADER_LEN)
    }

    /// Append a response body for `read_code` starting at `start_id`
    ///
    /// # Algorithm
    ///
    /// ```text
    /// 1. Eligible objects: in the category of read_code, id >= start_id
    /// 2. No eligible object at or after start_id: restart at id 0
    /// 3. Pack objects in id order while written + len + 2 < capacity
    /// 4. First object that does not fit: more follows = 0xFF, next id = its id
    /// 5. Patch the object count
    /// ```
    ///
    /// The object code (4) packs only the object with `start_id` and never
    /// wraps or sets more follows; an object too large for the PDU yields an
    /// empty response. Undefined read codes match nothing and yield an empty
    /// response.
    pub fn build(
        &self,
        store: &ObjectStore,
        read_code: u8,
        start_id: u8,
        buf: &mut BytesMut,
    ) -> BuildStatus {
        let base = buf.len();

        buf.reserve(RESPONSE_HEADER_LEN);
        buf.put_u8(MEI_DEVICE_IDENTIFICATION);
        buf.put_u8(read_code);
        buf.put_u8(self.conformity_level);
        buf.put_u8(NO_MORE_FOLLOWS);
        buf.put_u8(0);
        buf.put_u8(0);

        let mut status = BuildStatus {
            bytes_written: RESPONSE_HEADER_LEN,
            object_count: 0,
            more_follows: false,
            next_object_id: 0,
        };

        let code = match ReadDeviceIdCode::try_from(read_code) {
            Ok(code) => code,
            Err(e) => {
                debug!(read_code = read_code, "{}, responding with no objects", e);
                return status;
            }
        };

        if code.is_stream() {
            let start = self.resolve_start(store, code, start_id);
            for obj in store.iter_category(code, start) {
                if !self.pack(obj, buf, &mut status) {
                    break;
                }
            }
        } else if let Some(obj) = store.get(start_id) {
            if !self.pack(obj, buf, &mut status) {
                debug!(
                    object_id = start_id,
                    len = obj.len(),
                    "Object does not fit in one response"
                );
                status.more_follows = false;
                status.next_object_id = 0;
            }
        }

        buf[base + offsets::OBJECT_COUNT] = status.object_count;
        if status.more_follows {
            buf[base + offsets::MORE_FOLLOWS] = MORE_FOLLOWS;
            buf[base + offsets::NEXT_OBJECT_ID] = status.next_object_id;
        }

        trace!(
            read_code = read_code,
            start_id = start_id,
            objects = status.object_count,
            more_follows = status.more_follows,
            next_object_id = status.next_object_id,
            body = %hex::encode(&buf[base..]),
            "Built device id response"
        );

        status
    }

    fn resolve_start(&self, store: &ObjectStore, code: ReadDeviceIdCode, start_id: u8) -> u8 {
        if start_id != 0 && store.count_in_category(code, start_id) == 0 {
            debug!(
                code = %code,
                start_id = start_id,
                "No eligible object at or after start id, wrapping to 0"
            );
            return 0;
        }
        start_id
    }

    /// Append `obj` if it fits, otherwise mark the response as segmented
    fn pack(&self, obj: &DeviceIdObject, buf: &mut BytesMut, status: &mut BuildStatus) -> bool {
        if status.bytes_written + obj.encoded_len() >= self.capacity() {
            status.more_follows = true;
            status.next_object_id = obj.id();
            return false;
        }

        buf.put_u8(obj.id());
        buf.put_u8(obj.len());
        buf.put_slice(obj.data());

        status.bytes_written += obj.encoded_len();
        status.object_count += 1;
        true
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a response body with the default builder
pub fn build_response(
    store: &ObjectStore,
    read_code: u8,
    start_id: u8,
    buf: &mut BytesMut,
) -> BuildStatus {
    ResponseBuilder::new().build(store, read_code, start_id, buf)
}

/// Fixed fields of a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub mei_type: u8,
    pub read_code: u8,
    pub conformity_level: u8,
    pub more_follows: bool,
    pub next_object_id: u8,
    pub object_count: u8,
}

impl ResponseHeader {
    /// Decode the fixed fields of a response body
    ///
    /// # Errors
    ///
    /// Returns an error if the body is shorter than the header or carries a
    /// MEI type other than device identification.
    pub fn decode(body: &[u8]) -> Result<Self> {
        if body.len() < RESPONSE_HEADER_LEN {
            return Err(Error::PduTooShort {
                expected: RESPONSE_HEADER_LEN,
                actual: body.len(),
            });
        }

        let mut buf = body;
        let header = Self {
            mei_type: buf.get_u8(),
            read_code: buf.get_u8(),
            conformity_level: buf.get_u8(),
            more_follows: buf.get_u8() == MORE_FOLLOWS,
            next_object_id: buf.get_u8(),
            object_count: buf.get_u8(),
        };

        if header.mei_type != MEI_DEVICE_IDENTIFICATION {
            return Err(Error::InvalidMeiType(header.mei_type));
        }

        Ok(header)
    }
}

/// Result of parsing one response into a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub header: ResponseHeader,

    /// Objects inserted by this call
    pub inserted: usize,

    /// Failure that stopped parsing before the advertised count was reached
    pub error: Option<Error>,
}

impl ParsedResponse {
    /// Check if every advertised object was inserted
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Parse a response body and insert its objects into `store`
///
/// Parsing stops at the first object tuple that runs past the end of the
/// body or cannot be inserted (duplicate id, allocation failure). That
/// failure is returned in [`ParsedResponse::error`] together with the number
/// of objects inserted before it; those objects stay in the store.
///
/// # Errors
///
/// Returns an error if the header is truncated or has the wrong MEI type.
pub fn parse_response(body: &[u8], store: &mut ObjectStore) -> Result<ParsedResponse> {
    let header = ResponseHeader::decode(body)?;

    let mut buf = &body[RESPONSE_HEADER_LEN..];
    let mut inserted = 0;
    let mut error = None;

    for index in 0..usize::from(header.object_count) {
        if let Err(e) = insert_next(&mut buf, index, store) {
            debug!(index = index, inserted = inserted, "Stopped parsing response: {}", e);
            error = Some(e);
            break;
        }
        inserted += 1;
    }

    trace!(
        objects = header.object_count,
        inserted = inserted,
        more_follows = header.more_follows,
        next_object_id = header.next_object_id,
        "Parsed device id response"
    );

    Ok(ParsedResponse {
        header,
        inserted,
        error,
    })
}

fn insert_next(buf: &mut &[u8], index: usize, store: &mut ObjectStore) -> Result<()> {
    if buf.remaining() < OBJECT_OVERHEAD {
        return Err(Error::MalformedResponse {
            index,
            needed: OBJECT_OVERHEAD,
            available: buf.remaining(),
        });
    }

    let id = buf.get_u8();
    let len = usize::from(buf.get_u8());

    if buf.remaining() < len {
        return Err(Error::MalformedResponse {
            index,
            needed: len,
            available: buf.remaining(),
        });
    }

    store.insert(id, &buf[..len])?;
    buf.advance(len);
    Ok(())
}
