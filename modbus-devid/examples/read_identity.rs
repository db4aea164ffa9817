//! Serve identification objects over a loopback link and read them back

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use modbus_devid::{Client, LoopbackTransport, ReadDeviceIdCode, ResponseBuilder, Server};

const LONG_TEXT: &[u8] =
    b"ABCDEFGHIJKLMNOPQRTUVWXYZabcdefghijklmnopqrstuvwyxz1234567890abcdefghlijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    // Response size is configurable to force segmentation
    let max_pdu_length = std::env::var("MAX_PDU_LENGTH")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(253);

    let server = Server::new()
        .with_response_builder(ResponseBuilder::new().with_max_pdu_length(max_pdu_length));

    server.set_object(0x00, b"VendorName:A")?;
    server.set_object(0x01, b"ProductCode:B")?;
    server.set_object(0x02, b"MajorMinorVersion:C")?;
    server.set_object(0x03, b"VendorUrl:D")?;
    server.set_object(0x04, b"ProductName:E")?;
    server.set_object(0x05, b"ModelName:F")?;
    server.set_object(0x80, b"L0:GoofBallers")?;
    server.set_object(0x81, &[b"L1:".as_slice(), LONG_TEXT].concat())?;
    server.set_object(0x82, &[b"L2:".as_slice(), LONG_TEXT].concat())?;

    let (transport, loopback) = LoopbackTransport::pair("demo");
    loopback.spawn(Arc::new(server));

    let mut client = Client::new(transport);

    for code in [
        ReadDeviceIdCode::Basic,
        ReadDeviceIdCode::Regular,
        ReadDeviceIdCode::Extended,
    ] {
        let objects = client.read_device_identification(code, 0).await?;
        println!("{}: {} objects", code, objects.len());
        for obj in &objects {
            println!("  0x{:02X}: {}", obj.id(), String::from_utf8_lossy(obj.data()));
        }
    }

    let obj = client.read_object(0x80).await?;
    println!("Object 0x80: {}", String::from_utf8_lossy(obj.data()));

    let identity = client.read_identity().await?;
    println!("✓ Device: {}", identity);

    client.disconnect().await?;
    println!("✓ Disconnected");

    Ok(())
}
