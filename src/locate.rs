//! Resolving a serial number to a connectable peripheral.

use btleplug::api::{Central, CentralEvent, ScanFilter};
use btleplug::platform::{Adapter, Peripheral};
use tokio::time::timeout;
use tokio_stream::StreamExt;
use tracing::{debug, info};

use crate::error::Error;
use crate::serial::SerialNumber;
use crate::Protocol;

/// The serial number embedded in manufacturer specific advertisement data.
///
/// btleplug keys the manufacturer data map by company id, so the serial
/// number is the first four bytes of the remaining payload.
fn advertised_serial(data: &[u8]) -> Option<u32> {
    let bytes = data.get(..4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Scan for the device with the given serial number.
///
/// Runs an active scan until an advertisement carrying the vendor company id
/// and a matching embedded serial shows up, bounded by
/// [`Protocol::scan_timeout`]. The scan is stopped again on every exit path.
pub async fn locate(
    adapter: &Adapter,
    protocol: &Protocol,
    serial: SerialNumber,
) -> Result<Peripheral, Error> {
    let mut events = adapter.events().await?;
    adapter.start_scan(ScanFilter::default()).await?;
    info!("scanning for device with serial number {}", serial);

    let found = timeout(protocol.scan_timeout, async {
        while let Some(event) = events.next().await {
            if let CentralEvent::ManufacturerDataAdvertisement {
                id,
                manufacturer_data,
            } = event
            {
                if let Some(data) = manufacturer_data.get(&protocol.company_id) {
                    debug!("manufacturer data from {:?}: {:02x?}", id, data);
                    if advertised_serial(data) == Some(serial.advertised()) {
                        return Some(id);
                    }
                }
            }
        }
        None
    })
    .await;

    let stopped = adapter.stop_scan().await;

    match found {
        Ok(Some(id)) => {
            stopped?;
            info!("found device {:?}", id);
            Ok(adapter.peripheral(&id).await?)
        }
        // timeout, or the event stream ended under us
        _ => Err(Error::DeviceNotFound {
            serial,
            timeout: protocol.scan_timeout,
        }),
    }
}
