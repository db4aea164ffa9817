//! Server-side request dispatch

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use modbus_devid_core::{
    constants::{FUNCTION_CODE, MAX_PDU_LENGTH},
    request, ExceptionCode, ObjectStore, ReadDeviceIdCode, Request, ResponseBuilder,
    SharedObjectStore,
};
use modbus_devid_transport::PduHandler;

use crate::error::Result;

/// Device identification server
///
/// Answers Read Device Identification requests from a shared object store.
///
/// # Examples
///
/// ```
/// use modbus_devid::Server;
///
/// let server = Server::new();
/// server.set_object(0x00, b"Acme").unwrap();
/// server.set_object(0x01, b"PC-100").unwrap();
/// server.set_object(0x02, b"v1.2").unwrap();
///
/// let response = server.handle_request(&[0x2B, 0x0E, 0x01, 0x00]);
/// assert_eq!(response[0], 0x2B);
/// assert_eq!(response[6], 3); // object count
/// ```
#[derive(Debug, Clone, Default)]
pub struct Server {
    store: SharedObjectStore,
    builder: ResponseBuilder,
}

impl Server {
    /// Create a server with an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a server answering from `store`
    pub fn with_store(store: impl Into<SharedObjectStore>) -> Self {
        Self {
            store: store.into(),
            builder: ResponseBuilder::new(),
        }
    }

    /// Set response builder (PDU size, conformity level)
    pub fn with_response_builder(mut self, builder: ResponseBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Add an identification object
    ///
    /// The first value set for an id is kept.
    pub fn set_object(&self, id: u8, data: &[u8]) -> Result<()> {
        self.store.insert(id, data)?;
        Ok(())
    }

    /// Shared handle to the object store
    pub fn store(&self) -> &SharedObjectStore {
        &self.store
    }

    /// Answer one request PDU
    ///
    /// Returns either a device identification response or an exception
    /// response; never fails.
    pub fn handle_request(&self, pdu: &[u8]) -> Bytes {
        trace!(request = %hex::encode(pdu), "Device id request");

        let function = pdu.first().copied().unwrap_or(FUNCTION_CODE);
        if function != FUNCTION_CODE {
            return exception(function, ExceptionCode::IllegalFunction);
        }

        let (Some(mei), Some(raw_code), Some(object_id)) = (
            request::mei_type(pdu),
            request::read_device_id_code(pdu),
            request::object_id(pdu),
        ) else {
            return exception(function, ExceptionCode::IllegalDataValue);
        };

        let request = match Request::decode(pdu) {
            Ok(request) => request,
            Err(e) => {
                debug!(mei_type = mei, read_code = raw_code, "Rejected request: {}", e);
                let code = if matches!(e, modbus_devid_core::Error::InvalidMeiType(_)) {
                    ExceptionCode::IllegalFunction
                } else {
                    ExceptionCode::IllegalDataValue
                };
                return exception(function, code);
            }
        };

        let store = self.store.read();

        if request.read_code == ReadDeviceIdCode::Object && !store.validate_id(object_id) {
            debug!(object_id = object_id, "Rejected request for unknown object");
            return exception(function, ExceptionCode::IllegalDataAddress);
        }

        self.respond(&store, request)
    }

    fn respond(&self, store: &ObjectStore, request: Request) -> Bytes {
        let mut buf = BytesMut::with_capacity(MAX_PDU_LENGTH);
        buf.put_u8(FUNCTION_CODE);

        let status = self.builder.build(
            store,
            request.read_code.into(),
            request.object_id,
            &mut buf,
        );

        if request.read_code == ReadDeviceIdCode::Object && status.object_count == 0 {
            debug!(request = %request, "Object too large for the response PDU");
            return exception(FUNCTION_CODE, ExceptionCode::ServerDeviceFailure);
        }

        debug!(
            request = %request,
            objects = status.object_count,
            more_follows = status.more_follows,
            next_object_id = status.next_object_id,
            "Device id response"
        );

        buf.freeze()
    }
}

impl PduHandler for Server {
    fn handle(&self, request: &[u8]) -> Bytes {
        self.handle_request(request)
    }
}

fn exception(function: u8, code: ExceptionCode) -> Bytes {
    debug!(function = function, exception = %code, "Exception response");
    code.encode(function).freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use modbus_devid_core::{parse_response, ResponseHeader};
    use pretty_assertions::assert_eq;

    const OBJECTS: [(u8, &[u8]); 5] = [
        (0x00, b"Acme"),
        (0x01, b"PC-100"),
        (0x02, b"v1.2"),
        (0x04, b"Pump"),
        (0x80, b"private"),
    ];

    fn server() -> Server {
        let server = Server::new();
        for (id, data) in OBJECTS {
            server.set_object(id, data).unwrap();
        }
        server
    }

    fn objects(response: &[u8]) -> Vec<u8> {
        assert_eq!(response[0], FUNCTION_CODE);
        let mut store = ObjectStore::new();
        parse_response(&response[1..], &mut store).unwrap();
        store.iter().map(|obj| obj.id()).collect()
    }

    #[test]
    fn test_basic_request() {
        let response = server().handle_request(&[0x2B, 0x0E, 0x01, 0x00]);
        assert_eq!(objects(&response), vec![0x00, 0x01, 0x02]);
    }

    #[test]
    fn test_extended_request() {
        let response = server().handle_request(&[0x2B, 0x0E, 0x03, 0x00]);
        assert_eq!(objects(&response), vec![0x00, 0x01, 0x02, 0x04, 0x80]);
    }

    #[test]
    fn test_object_request() {
        let response = server().handle_request(&[0x2B, 0x0E, 0x04, 0x04]);
        assert_eq!(objects(&response), vec![0x04]);

        let header = ResponseHeader::decode(&response[1..]).unwrap();
        assert_eq!(header.read_code, 0x04);
        assert!(!header.more_follows);
    }

    #[test]
    fn test_unknown_object_rejected() {
        let response = server().handle_request(&[0x2B, 0x0E, 0x04, 0x05]);
        assert_eq!(&response[..], &[0xAB, 0x02]);
    }

    #[test]
    fn test_unknown_start_id_wraps() {
        // Stream codes restart at id 0 instead of raising an exception
        let response = server().handle_request(&[0x2B, 0x0E, 0x02, 0x7F]);
        assert_eq!(objects(&response), vec![0x00, 0x01, 0x02, 0x04]);
    }

    #[test]
    fn test_invalid_read_code() {
        let response = server().handle_request(&[0x2B, 0x0E, 0x05, 0x00]);
        assert_eq!(&response[..], &[0xAB, 0x03]);
    }

    #[test]
    fn test_invalid_mei_type() {
        let response = server().handle_request(&[0x2B, 0x0D, 0x01, 0x00]);
        assert_eq!(&response[..], &[0xAB, 0x01]);
    }

    #[test]
    fn test_wrong_function() {
        let response = server().handle_request(&[0x03, 0x00, 0x00, 0x00, 0x01]);
        assert_eq!(&response[..], &[0x83, 0x01]);
    }

    #[test]
    fn test_truncated_request() {
        let response = server().handle_request(&[0x2B, 0x0E]);
        assert_eq!(&response[..], &[0xAB, 0x03]);

        let response = server().handle_request(&[]);
        assert_eq!(&response[..], &[0xAB, 0x03]);
    }

    #[test]
    fn test_segmented_response() {
        let server = server().with_response_builder(ResponseBuilder::new().with_max_pdu_length(24));

        let response = server.handle_request(&[0x2B, 0x0E, 0x01, 0x00]);
        let header = ResponseHeader::decode(&response[1..]).unwrap();

        assert!(header.more_follows);
        assert_eq!(header.next_object_id, 0x01);
        assert_eq!(objects(&response), vec![0x00]);
    }

    #[test]
    fn test_object_too_large_for_pdu() {
        let server = Server::new().with_response_builder(ResponseBuilder::new().with_max_pdu_length(24));
        server.set_object(0x80, &[0x55; 32]).unwrap();

        let response = server.handle_request(&[0x2B, 0x0E, 0x04, 0x80]);
        assert_eq!(&response[..], &[0xAB, 0x04]);

        // Stream codes still segment
        let response = server.handle_request(&[0x2B, 0x0E, 0x03, 0x80]);
        let header = ResponseHeader::decode(&response[1..]).unwrap();
        assert!(header.more_follows);
        assert_eq!(header.object_count, 0);
    }

    #[test]
    fn test_first_write_wins() {
        let server = server();
        assert!(server.set_object(0x00, b"Other").is_err());
        assert_eq!(server.store().get(0x00).unwrap().data(), b"Acme");
    }
}
