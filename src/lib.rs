//! Read Airthings Wave Plus environmental sensors over BLE.
//!
//! The device exposes all current sensor values through a single GATT
//! characteristic and identifies itself by embedding its serial number in
//! manufacturer specific advertisement data. A typical consumer resolves the
//! serial to a peripheral once, then polls the characteristic at the device's
//! duty cycle:
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use waveplus::{
//!     default_adapter, locate, ConnectionManager, Error, PipeSink, Poller, Protocol,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let protocol = Protocol::default();
//!     let adapter = default_adapter().await?;
//!
//!     let serial = "2930123456".parse()?;
//!     let device = locate(&adapter, &protocol, serial).await?;
//!
//!     let link = ConnectionManager::new(device, protocol);
//!     let mut sink = PipeSink::new(std::io::stdout());
//!     let mut poller = Poller::new(link, Duration::from_secs(300));
//!     poller
//!         .run(&mut sink, async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await
//! }
//! ```

mod connection;
mod error;
mod locate;
mod payload;
mod poller;
mod serial;
mod sink;
mod units;

use std::time::Duration;

use btleplug::api::Manager as _;
use btleplug::platform::{Adapter, Manager};
use uuid::Uuid;

pub use connection::{ConnectionManager, ConnectionState, SensorLink};
pub use error::Error;
pub use locate::locate;
pub use payload::{decode, PayloadVersion, RawPayload, SensorReading, PAYLOAD_LEN};
pub use poller::Poller;
pub use serial::SerialNumber;
pub use sink::{PipeSink, Sink, TerminalSink};

/// Bluetooth SIG company identifier of Airthings AS, used to pick the
/// device's advertisements out of a scan.
pub const COMPANY_ID: u16 = 0x0334;

/// Characteristic holding the current sensor values.
pub const CURRENT_VALUES_UUID: Uuid = Uuid::from_u128(0xb42e2a68_ade7_11e4_89d3_123b93f75cba);

/// The protocol constants and timing limits for talking to a device.
///
/// Constructed once and passed to [`locate`] and [`ConnectionManager`]. The
/// defaults match the device, only the timing limits are worth tuning.
#[derive(Debug, Clone)]
pub struct Protocol {
    /// Manufacturer id expected in advertisement data.
    pub company_id: u16,
    /// Characteristic to read sensor values from.
    pub characteristic: Uuid,
    /// How long to scan for a matching advertisement.
    pub scan_timeout: Duration,
    /// Connection attempts before giving up.
    pub connect_attempts: u32,
    /// Delay after the first failed connection attempt, doubled per retry.
    pub connect_backoff: Duration,
    /// Upper bound for a single characteristic read.
    pub read_timeout: Duration,
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol {
            company_id: COMPANY_ID,
            characteristic: CURRENT_VALUES_UUID,
            scan_timeout: Duration::from_secs(15),
            connect_attempts: 3,
            connect_backoff: Duration::from_millis(500),
            read_timeout: Duration::from_secs(10),
        }
    }
}

/// The first available Bluetooth adapter on the system.
pub async fn default_adapter() -> Result<Adapter, Error> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    adapters.into_iter().next().ok_or(Error::NoAdapter)
}
