use std::io;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::serial::SerialNumber;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid serial number {0:?}, expected exactly 10 digits")]
    InvalidSerial(String),
    #[error("invalid sample period {0:?}, expected a positive number of seconds")]
    InvalidSamplePeriod(String),
    #[error("unknown mode {0:?}, expected \"terminal\" or \"pipe\"")]
    UnknownMode(String),
    #[error("no bluetooth adapter available")]
    NoAdapter,
    #[error("no device with serial number {serial} found within {timeout:?}")]
    DeviceNotFound {
        serial: SerialNumber,
        timeout: Duration,
    },
    #[error("failed to connect after {attempts} attempts")]
    ConnectionFailed {
        attempts: u32,
        #[source]
        source: btleplug::Error,
    },
    #[error("device has no characteristic {0}")]
    MissingCharacteristic(Uuid),
    #[error("characteristic read timed out after {0:?}")]
    ReadTimeout(Duration),
    #[error("characteristic read failed")]
    ReadError(#[source] btleplug::Error),
    #[error("unsupported payload format {0:#04x}")]
    UnsupportedFormat(u8),
    #[error("payload truncated, got {0} bytes instead of {expected}", expected = crate::payload::PAYLOAD_LEN)]
    TruncatedPayload(usize),
    #[error(transparent)]
    Bluetooth(#[from] btleplug::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the error should stop the poll loop instead of failing a
    /// single tick.
    ///
    /// A payload format mismatch will not heal by re-reading, and a sink
    /// error means the consumer is gone. Transport errors are worth retrying
    /// on the next tick.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_) | Error::Io(_))
    }
}
