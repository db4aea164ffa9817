//! # modbus-devid
//!
//! Modbus Read Device Identification (function 0x2B, MEI type 0x0E).
//!
//! ## Features
//!
//! - Ordered identification object store shared by server tasks
//! - Segmented responses bounded by the 253-byte PDU limit
//! - Async client that follows "more follows" continuations
//! - Typed device identity from the standard objects
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use modbus_devid::{Client, LoopbackTransport, Server};
//!
//! #[tokio::main]
//! async fn main() -> modbus_devid::Result<()> {
//!     // Populate server objects
//!     let server = Server::new();
//!     server.set_object(0x00, b"Acme")?;
//!     server.set_object(0x01, b"PC-100")?;
//!     server.set_object(0x02, b"v1.2")?;
//!
//!     let (transport, loopback) = LoopbackTransport::pair("device");
//!     loopback.spawn(Arc::new(server));
//!
//!     // Read identity
//!     let mut client = Client::new(transport);
//!     let identity = client.read_identity().await?;
//!     println!("{}", identity);
//!
//!     client.disconnect().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod server;

// Re-exports
pub use client::Client;
pub use error::{Error, Result};
pub use server::Server;

// Re-export protocol types
pub use modbus_devid_core::{
    DeviceIdObject, ExceptionCode, ObjectId, ObjectStore, ReadDeviceIdCode, Request,
    ResponseBuilder, SharedObjectStore,
};
pub use modbus_devid_transport::{LoopbackServer, LoopbackTransport, PduHandler, Transport};
pub use modbus_devid_types::DeviceIdentity;
