//! Conversions from the raw integer fields in the sensor payload to physical
//! units.
//!
//! Kept separate from the byte-level decoding so the scaling rules can be
//! checked in isolation. All functions are pure.

/// Highest raw radon value the device reports as a real measurement.
///
/// Values above this mean the average is not available yet (the device needs
/// roughly a day of uptime for the short term average) or the measurement is
/// invalid.
pub const RADON_MAX: u16 = 16383;

/// Relative humidity in %rH, half-percent resolution.
pub fn humidity_percent(raw: u8) -> f32 {
    raw as f32 / 2.0
}

/// Radon concentration in Bq/m³, or `None` for the unavailable sentinel.
pub fn radon_becquerels(raw: u16) -> Option<u16> {
    if raw <= RADON_MAX {
        Some(raw)
    } else {
        None
    }
}

/// Temperature in °C, centidegree resolution.
pub fn temperature_celsius(raw: u16) -> f32 {
    raw as f32 / 100.0
}

/// Relative atmospheric pressure in hPa.
pub fn pressure_hectopascals(raw: u16) -> f32 {
    raw as f32 / 50.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humidity_is_half_percent_steps() {
        assert_eq!(humidity_percent(0), 0.0);
        assert_eq!(humidity_percent(50), 25.0);
        assert_eq!(humidity_percent(113), 56.5);
    }

    #[test]
    fn radon_passes_valid_range_through() {
        assert_eq!(radon_becquerels(0), Some(0));
        assert_eq!(radon_becquerels(40), Some(40));
        assert_eq!(radon_becquerels(RADON_MAX), Some(16383));
    }

    #[test]
    fn radon_sentinel_is_unavailable() {
        assert_eq!(radon_becquerels(RADON_MAX + 1), None);
        assert_eq!(radon_becquerels(u16::MAX), None);
    }

    #[test]
    fn temperature_is_centidegrees() {
        assert_eq!(temperature_celsius(2500), 25.0);
        assert_eq!(temperature_celsius(0), 0.0);
        assert_eq!(temperature_celsius(1995), 19.95);
    }

    #[test]
    fn pressure_is_fiftieths() {
        assert_eq!(pressure_hectopascals(50000), 1000.0);
        assert_eq!(pressure_hectopascals(49663), 993.26);
    }
}
