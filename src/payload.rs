//! Decoding of the current values characteristic.
//!
//! The payload is a fixed 20 byte little endian layout: a format byte,
//! humidity, an ambient light byte that is not surfaced, one unused byte,
//! then u16 fields for the radon averages, temperature, pressure, CO2 and
//! TVOC, with four trailing unused bytes.

use num_enum::TryFromPrimitive;
use time::OffsetDateTime;

use crate::error::Error;
use crate::units;

/// Size of one characteristic read.
pub const PAYLOAD_LEN: usize = 20;

/// Known layouts of the current values payload, identified by the leading
/// format byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum PayloadVersion {
    V1 = 1,
}

/// The bytes of a single characteristic read together with the time the read
/// completed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPayload {
    pub bytes: Vec<u8>,
    pub captured_at: OffsetDateTime,
}

impl RawPayload {
    pub fn new(bytes: Vec<u8>, captured_at: OffsetDateTime) -> Self {
        RawPayload { bytes, captured_at }
    }
}

/// One complete measurement, converted to physical units.
///
/// The radon averages are `None` while the device has not collected enough
/// data to report them, the raw sentinel never leaks out of the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Relative humidity in %rH.
    pub humidity: f32,
    /// Radon short term average in Bq/m³.
    pub radon_short: Option<u16>,
    /// Radon long term average in Bq/m³.
    pub radon_long: Option<u16>,
    /// Temperature in °C.
    pub temperature: f32,
    /// Relative atmospheric pressure in hPa.
    pub pressure: f32,
    /// CO2 level in ppm.
    pub co2: u16,
    /// TVOC level in ppb.
    pub tvoc: u16,
    /// When the payload was read from the device.
    pub captured_at: OffsetDateTime,
}

/// Decode one payload into a reading.
///
/// Deterministic: the same payload always decodes to the same reading.
pub fn decode(payload: &RawPayload) -> Result<SensorReading, Error> {
    let bytes = payload.bytes.as_slice();
    if bytes.len() != PAYLOAD_LEN {
        return Err(Error::TruncatedPayload(bytes.len()));
    }
    PayloadVersion::try_from(bytes[0]).map_err(|e| Error::UnsupportedFormat(e.number))?;

    let u16_at = |offset: usize| u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);

    Ok(SensorReading {
        humidity: units::humidity_percent(bytes[1]),
        radon_short: units::radon_becquerels(u16_at(4)),
        radon_long: units::radon_becquerels(u16_at(6)),
        temperature: units::temperature_celsius(u16_at(8)),
        pressure: units::pressure_hectopascals(u16_at(10)),
        co2: u16_at(12),
        tvoc: u16_at(14),
        captured_at: payload.captured_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn payload_bytes(
        humidity: u8,
        radon_short: u16,
        radon_long: u16,
        temperature: u16,
        pressure: u16,
        co2: u16,
        tvoc: u16,
    ) -> Vec<u8> {
        let mut bytes = vec![1, humidity, 0, 0];
        for field in [radon_short, radon_long, temperature, pressure, co2, tvoc] {
            bytes.extend_from_slice(&field.to_le_bytes());
        }
        bytes.extend_from_slice(&[0; 4]);
        bytes
    }

    fn payload(bytes: Vec<u8>) -> RawPayload {
        RawPayload::new(bytes, datetime!(2024-06-15 14:30:00 UTC))
    }

    #[test]
    fn golden_decode() {
        let raw = payload(payload_bytes(50, 40, 45, 2500, 50000, 800, 200));
        let reading = decode(&raw).unwrap();

        assert_eq!(reading.humidity, 25.0);
        assert_eq!(reading.radon_short, Some(40));
        assert_eq!(reading.radon_long, Some(45));
        assert_eq!(reading.temperature, 25.0);
        assert_eq!(reading.pressure, 1000.0);
        assert_eq!(reading.co2, 800);
        assert_eq!(reading.tvoc, 200);
        assert_eq!(reading.captured_at, datetime!(2024-06-15 14:30:00 UTC));
    }

    #[test]
    fn decode_is_deterministic() {
        let raw = payload(payload_bytes(113, 16383, 16384, 1995, 49663, 1234, 87));
        assert_eq!(decode(&raw).unwrap(), decode(&raw).unwrap());
    }

    #[test]
    fn radon_sentinel_never_surfaces() {
        let raw = payload(payload_bytes(50, 16384, u16::MAX, 2500, 50000, 800, 200));
        let reading = decode(&raw).unwrap();

        assert_eq!(reading.radon_short, None);
        assert_eq!(reading.radon_long, None);
    }

    #[test]
    fn radon_boundary_is_a_measurement() {
        let raw = payload(payload_bytes(50, 16383, 0, 2500, 50000, 800, 200));
        let reading = decode(&raw).unwrap();

        assert_eq!(reading.radon_short, Some(16383));
        assert_eq!(reading.radon_long, Some(0));
    }

    #[test]
    fn unknown_format_byte_is_rejected() {
        let mut bytes = payload_bytes(50, 40, 45, 2500, 50000, 800, 200);
        bytes[0] = 2;

        match decode(&payload(bytes)) {
            Err(Error::UnsupportedFormat(2)) => {}
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn short_payload_is_rejected() {
        match decode(&payload(vec![1, 2, 3])) {
            Err(Error::TruncatedPayload(3)) => {}
            other => panic!("expected TruncatedPayload, got {:?}", other),
        }
    }

    #[test]
    fn long_payload_is_rejected() {
        let mut bytes = payload_bytes(50, 40, 45, 2500, 50000, 800, 200);
        bytes.push(0);
        assert!(matches!(
            decode(&payload(bytes)),
            Err(Error::TruncatedPayload(21))
        ));
    }
}
