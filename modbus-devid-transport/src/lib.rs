//! Transport boundary for Modbus device identification
//!
//! Transports move whole PDUs; ADU framing (MBAP header, RTU address and
//! CRC) belongs to the implementation behind the trait.

pub mod error;
pub mod loopback;

pub use error::{Error, Result};
pub use loopback::{LoopbackServer, LoopbackTransport};

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};

/// PDU transport to a Modbus server
#[async_trait]
pub trait Transport: Send + Sync {
    /// Disconnect from server
    async fn disconnect(&mut self) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send one request PDU
    async fn send(&mut self, pdu: &[u8]) -> Result<()>;

    /// Receive one response PDU (with timeout)
    async fn receive(&mut self, timeout: Duration) -> Result<BytesMut>;

    /// Get remote address
    fn remote_addr(&self) -> String;
}

/// Anything that answers a request PDU with a response PDU
pub trait PduHandler: Send + Sync {
    fn handle(&self, request: &[u8]) -> Bytes;
}
