//! In-process loopback transport
//!
//! Connects a client to a [`PduHandler`] running on the same runtime
//! through a pair of bounded channels. Useful for tests and for embedding
//! a server and client in one process.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::{error::*, PduHandler, Transport};

/// Maximum PDU size accepted by the loopback (Modbus PDU limit)
const MAX_PDU_SIZE: usize = 253;

/// Requests that may be queued before `send` waits
const CHANNEL_DEPTH: usize = 8;

/// Client end of a loopback pair
pub struct LoopbackTransport {
    name: String,
    requests: Option<mpsc::Sender<Bytes>>,
    responses: mpsc::Receiver<Bytes>,
}

/// Server end of a loopback pair
pub struct LoopbackServer {
    requests: mpsc::Receiver<Bytes>,
    responses: mpsc::Sender<Bytes>,
}

impl LoopbackTransport {
    /// Create a connected client/server pair
    pub fn pair(name: impl Into<String>) -> (Self, LoopbackServer) {
        let (request_tx, request_rx) = mpsc::channel(CHANNEL_DEPTH);
        let (response_tx, response_rx) = mpsc::channel(CHANNEL_DEPTH);

        let transport = Self {
            name: name.into(),
            requests: Some(request_tx),
            responses: response_rx,
        };
        let server = LoopbackServer {
            requests: request_rx,
            responses: response_tx,
        };

        (transport, server)
    }
}

impl LoopbackServer {
    /// Answer requests with `handler` until the client disconnects
    pub async fn run(mut self, handler: Arc<dyn PduHandler>) {
        while let Some(request) = self.requests.recv().await {
            trace!(request = %hex::encode(&request), "Loopback request");

            let response = handler.handle(&request);

            if self.responses.send(response).await.is_err() {
                warn!("Loopback client dropped before response was delivered");
                break;
            }
        }

        debug!("Loopback server stopped");
    }

    /// Spawn [`run`](Self::run) on the current runtime
    pub fn spawn(self, handler: Arc<dyn PduHandler>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(handler))
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn disconnect(&mut self) -> Result<()> {
        if self.requests.take().is_some() {
            debug!("Disconnecting from {}...", self.name);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.requests.is_some()
    }

    async fn send(&mut self, pdu: &[u8]) -> Result<()> {
        let requests = self.requests.as_ref().ok_or(Error::NotConnected)?;

        if pdu.len() > MAX_PDU_SIZE {
            return Err(Error::PduTooLarge {
                size: pdu.len(),
                max: MAX_PDU_SIZE,
            });
        }

        trace!("Sending {} bytes: {:02X?}", pdu.len(), pdu);

        requests
            .send(Bytes::copy_from_slice(pdu))
            .await
            .map_err(|_| Error::ConnectionClosed)
    }

    async fn receive(&mut self, read_timeout: Duration) -> Result<BytesMut> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let pdu = timeout(read_timeout, self.responses.recv())
            .await
            .map_err(|_| {
                warn!("Read timeout after {:?}", read_timeout);
                Error::ReadTimeout
            })?
            .ok_or(Error::ConnectionClosed)?;

        trace!("Received {} bytes: {:02X?}", pdu.len(), &pdu[..]);

        Ok(BytesMut::from(&pdu[..]))
    }

    fn remote_addr(&self) -> String {
        format!("loopback:{}", self.name)
    }
}
