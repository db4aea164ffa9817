//! Client-side device identification reads

use std::time::Duration;

use bytes::{Buf, BytesMut};
use tracing::{debug, info, trace, warn};

use modbus_devid_core::{
    constants::FUNCTION_CODE, parse_response, DeviceIdObject, ExceptionCode, ObjectStore,
    ReadDeviceIdCode, Request,
};
use modbus_devid_transport::Transport;
use modbus_devid_types::DeviceIdentity;

use crate::error::{Error, Result};

/// Device identification client
///
/// Issues Read Device Identification requests over a [`Transport`] and
/// reassembles segmented responses.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use modbus_devid::{Client, LoopbackTransport, ReadDeviceIdCode, Server};
///
/// #[tokio::main]
/// async fn main() -> modbus_devid::Result<()> {
///     let server = Server::new();
///     server.set_object(0x00, b"Acme")?;
///
///     let (transport, loopback) = LoopbackTransport::pair("device");
///     loopback.spawn(Arc::new(server));
///
///     let mut client = Client::new(transport);
///     let objects = client.read_device_identification(ReadDeviceIdCode::Basic, 0).await?;
///     println!("{} objects", objects.len());
///
///     client.disconnect().await?;
///     Ok(())
/// }
/// ```
pub struct Client {
    transport: Box<dyn Transport>,
    timeout: Duration,
    max_requests: usize,
}

impl Client {
    /// Default number of requests one identification read may take
    pub const DEFAULT_MAX_REQUESTS: usize = 32;

    /// Create a client over `transport`
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            timeout: Duration::from_secs(5),
            max_requests: Self::DEFAULT_MAX_REQUESTS,
        }
    }

    /// Set response timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the request limit for one segmented read
    pub fn with_max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests.max(1);
        self
    }

    /// Check if connected
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Disconnect from server
    pub async fn disconnect(&mut self) -> Result<()> {
        if !self.is_connected() {
            return Ok(());
        }

        info!("Disconnecting from {}...", self.transport.remote_addr());
        self.transport.disconnect().await?;
        Ok(())
    }

    /// Read every object of a category into a new store
    ///
    /// Repeats the request from the reported next object id until the
    /// server clears the more follows flag.
    pub async fn read_device_identification(
        &mut self,
        code: ReadDeviceIdCode,
        start_id: u8,
    ) -> Result<ObjectStore> {
        let mut store = ObjectStore::new();
        self.read_device_identification_into(code, start_id, &mut store)
            .await?;
        Ok(store)
    }

    /// Read every object of a category into `store`
    ///
    /// Objects already in `store` are kept; ids received again are skipped.
    /// Returns the number of objects inserted.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - the server answers with an exception
    /// - a response is malformed
    /// - the server sets more follows without sending any object
    /// - the read needs more than the configured number of requests
    pub async fn read_device_identification_into(
        &mut self,
        code: ReadDeviceIdCode,
        start_id: u8,
        store: &mut ObjectStore,
    ) -> Result<usize> {
        debug!(code = %code, start_id = start_id, "Reading device identification...");

        let mut start_id = start_id;
        let mut inserted = 0;

        for _ in 0..self.max_requests {
            let body = self.exchange(Request::new(code, start_id)).await?;
            let parsed = parse_response(&body, store)?;
            let header = parsed.header;

            if header.read_code != u8::from(code) {
                warn!(
                    expected = u8::from(code),
                    received = header.read_code,
                    "Response read code differs from request"
                );
            }

            inserted += parsed.inserted;
            match parsed.error {
                Some(e) if e.is_partial_success() => {
                    warn!(inserted = parsed.inserted, "Skipping rest of response: {}", e);
                }
                Some(e) => return Err(e.into()),
                None => {}
            }

            if !header.more_follows {
                debug!(inserted = inserted, total = store.len(), "Device identification complete");
                return Ok(inserted);
            }

            if header.object_count == 0 {
                return Err(Error::Stalled {
                    next_object_id: header.next_object_id,
                });
            }

            trace!(next_object_id = header.next_object_id, "More objects follow");
            start_id = header.next_object_id;
        }

        Err(Error::TooManyRequests {
            requests: self.max_requests,
        })
    }

    /// Read one object by id
    pub async fn read_object(&mut self, id: u8) -> Result<DeviceIdObject> {
        let mut store = ObjectStore::new();
        self.read_device_identification_into(ReadDeviceIdCode::Object, id, &mut store)
            .await?;

        store.get(id).cloned().ok_or_else(|| {
            Error::InvalidResponse(format!("object 0x{:02X} missing from response", id))
        })
    }

    /// Read the regular category as a typed identity
    pub async fn read_identity(&mut self) -> Result<DeviceIdentity> {
        let store = self
            .read_device_identification(ReadDeviceIdCode::Regular, 0)
            .await?;

        let identity = DeviceIdentity::from_objects(store.iter().map(|obj| (obj.id(), obj.data())))?;

        debug!("Device identity: {}", identity);

        Ok(identity)
    }

    // Helper methods

    /// Send one request and return the response body (function code stripped)
    async fn exchange(&mut self, request: Request) -> Result<BytesMut> {
        trace!("Sending: {}", request);

        let pdu = request.encode();
        self.transport.send(&pdu).await?;

        let mut response = self.transport.receive(self.timeout).await?;

        if let Some(code) = ExceptionCode::decode(&response) {
            let code = code?;
            debug!(exception = %code, "Server returned exception");
            return Err(Error::Exception(code));
        }

        match response.first() {
            Some(&FUNCTION_CODE) => {}
            Some(other) => {
                return Err(Error::InvalidResponse(format!(
                    "Unexpected function code: 0x{:02X}",
                    other
                )));
            }
            None => return Err(Error::InvalidResponse("Empty response".into())),
        }

        response.advance(1);
        Ok(response)
    }
}
