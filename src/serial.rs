use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The 10 digit serial number printed under the magnetic backplate of the
/// device.
///
/// The device broadcasts the serial as a little endian u32 inside its
/// manufacturer specific advertisement data, so the validated value is stored
/// in that representation. Validation happens here, before any radio
/// activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialNumber(u32);

impl SerialNumber {
    /// The serial as it appears in advertisement data.
    pub fn advertised(self) -> u32 {
        self.0
    }
}

impl FromStr for SerialNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 10 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidSerial(s.into()));
        }
        // 10 digit numbers can still overflow the advertised u32
        let value = s
            .parse()
            .map_err(|_| Error::InvalidSerial(s.into()))?;
        Ok(SerialNumber(value))
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ten_digits() {
        let serial = SerialNumber::from_str("2930123456").unwrap();
        assert_eq!(serial.advertised(), 2930123456);
        assert_eq!(serial.to_string(), "2930123456");
    }

    #[test]
    fn keeps_leading_zeros_in_display() {
        let serial = SerialNumber::from_str("0012345678").unwrap();
        assert_eq!(serial.to_string(), "0012345678");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(SerialNumber::from_str("123456789").is_err());
        assert!(SerialNumber::from_str("12345678901").is_err());
        assert!(SerialNumber::from_str("").is_err());
    }

    #[test]
    fn rejects_non_digits() {
        assert!(SerialNumber::from_str("29301234ab").is_err());
        assert!(SerialNumber::from_str("-930123456").is_err());
        assert!(SerialNumber::from_str("29301 3456").is_err());
    }

    #[test]
    fn rejects_values_outside_advertised_range() {
        // larger than any value the advertisement can carry
        assert!(SerialNumber::from_str("9999999999").is_err());
    }
}
