//! Exclusive link to a device.

use std::future::Future;
use std::time::Duration;

use btleplug::api::{Characteristic, Peripheral};
use time::OffsetDateTime;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::payload::RawPayload;
use crate::Protocol;

/// Link state, owned exclusively by [`ConnectionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// The transport capability the poll loop runs against.
///
/// Implemented by [`ConnectionManager`] for real hardware and by a scripted
/// fake in tests, keeping the loop and the decoder testable without a radio.
pub trait SensorLink {
    /// Read the current values payload, establishing the link if needed.
    fn read_current(&mut self) -> impl Future<Output = Result<RawPayload, Error>>;

    /// Release the link.
    fn disconnect(&mut self) -> impl Future<Output = ()>;
}

/// Owns the BLE link to one device: connecting with bounded retries, reading
/// the current values characteristic, and tolerating a single transient link
/// drop per read.
pub struct ConnectionManager<P: Peripheral> {
    peripheral: P,
    protocol: Protocol,
    characteristic: Option<Characteristic>,
    state: ConnectionState,
}

impl<P: Peripheral> ConnectionManager<P> {
    pub fn new(peripheral: P, protocol: Protocol) -> Self {
        ConnectionManager {
            peripheral,
            protocol,
            characteristic: None,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Establish the link, retrying with exponential backoff.
    ///
    /// BLE links are intermittently unavailable, the device may be asleep,
    /// out of range or held by another client.
    pub async fn connect(&mut self) -> Result<(), Error> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }
        self.state = ConnectionState::Connecting;

        let attempts = self.protocol.connect_attempts.max(1);
        let mut last = None;
        for attempt in 1..=attempts {
            if attempt > 1 {
                let delay = backoff_delay(self.protocol.connect_backoff, attempt - 1);
                debug!("retrying connection in {:?}", delay);
                sleep(delay).await;
            }
            match self.try_connect().await {
                Ok(()) => {
                    self.state = ConnectionState::Connected;
                    info!("connected to {}", self.peripheral.address());
                    return Ok(());
                }
                // a missing characteristic is permanent, not transient
                Err(err @ Error::MissingCharacteristic(_)) => {
                    self.disconnect().await;
                    self.state = ConnectionState::Failed;
                    return Err(err);
                }
                Err(Error::Bluetooth(err)) => {
                    warn!("connection attempt {}/{} failed: {}", attempt, attempts, err);
                    last = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        self.state = ConnectionState::Failed;
        Err(Error::ConnectionFailed {
            attempts,
            source: last.unwrap_or(btleplug::Error::NotConnected),
        })
    }

    async fn try_connect(&mut self) -> Result<(), Error> {
        self.peripheral.connect().await?;
        self.peripheral.discover_services().await?;
        let characteristic = self
            .peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == self.protocol.characteristic)
            .ok_or(Error::MissingCharacteristic(self.protocol.characteristic))?;
        self.characteristic = Some(characteristic);
        Ok(())
    }

    /// Read one current values payload.
    ///
    /// A failed read gets exactly one reconnect attempt and one retried read,
    /// tolerating a single transient link drop. If the reconnect fails the
    /// original read error propagates.
    pub async fn read_current(&mut self) -> Result<RawPayload, Error> {
        self.connect().await?;

        match self.try_read().await {
            Ok(payload) => Ok(payload),
            Err(err) => {
                warn!("read failed ({}), reconnecting once", err);
                self.disconnect().await;
                self.state = ConnectionState::Connecting;
                match self.try_connect().await {
                    Ok(()) => {
                        self.state = ConnectionState::Connected;
                        match self.try_read().await {
                            Ok(payload) => Ok(payload),
                            Err(retry_err) => {
                                self.disconnect().await;
                                Err(retry_err)
                            }
                        }
                    }
                    Err(reconnect_err) => {
                        debug!("reconnect failed: {}", reconnect_err);
                        self.state = ConnectionState::Disconnected;
                        Err(err)
                    }
                }
            }
        }
    }

    async fn try_read(&mut self) -> Result<RawPayload, Error> {
        let characteristic = self
            .characteristic
            .clone()
            .ok_or(Error::MissingCharacteristic(self.protocol.characteristic))?;

        match timeout(self.protocol.read_timeout, self.peripheral.read(&characteristic)).await {
            Err(_) => Err(Error::ReadTimeout(self.protocol.read_timeout)),
            Ok(Err(err)) => Err(Error::ReadError(err)),
            Ok(Ok(bytes)) => Ok(RawPayload::new(bytes, OffsetDateTime::now_utc())),
        }
    }

    /// Release the link. Idempotent, safe to call from any state.
    pub async fn disconnect(&mut self) {
        if let Err(err) = self.peripheral.disconnect().await {
            debug!("error while disconnecting: {}", err);
        }
        self.characteristic = None;
        self.state = ConnectionState::Disconnected;
    }
}

impl<P: Peripheral> SensorLink for ConnectionManager<P> {
    async fn read_current(&mut self) -> Result<RawPayload, Error> {
        ConnectionManager::read_current(self).await
    }

    async fn disconnect(&mut self) {
        ConnectionManager::disconnect(self).await
    }
}

fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base * 2u32.saturating_pow(retry - 1)
}
