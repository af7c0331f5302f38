//! Address range type.

use std::fmt;
use std::net::Ipv4Addr;

use crate::{Error, Result};

/// A closed interval of IPv4 addresses owned by one country.
///
/// Bounds are the big-endian integer form of the address (`u32::from`), so
/// `1.2.3.4` is `0x01020304`. Both `low` and `high` belong to the range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AddressRange {
    /// First address of the range
    pub low: u32,
    /// Last address of the range
    pub high: u32,
    /// Country code, as written in the dataset
    pub country: String,
}

impl AddressRange {
    /// Create a new range.
    pub fn new(low: u32, high: u32, country: impl Into<String>) -> Self {
        Self {
            low,
            high,
            country: country.into(),
        }
    }

    /// Create a range from IPv4 bounds.
    pub fn from_addrs(low: Ipv4Addr, high: Ipv4Addr, country: impl Into<String>) -> Self {
        Self::new(u32::from(low), u32::from(high), country)
    }

    /// Check whether `address` lies inside this range.
    pub fn contains(&self, address: u32) -> bool {
        self.low <= address && address <= self.high
    }

    /// Number of addresses covered.
    pub fn size(&self) -> u64 {
        u64::from(self.high) - u64::from(self.low) + 1
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {}",
            Ipv4Addr::from(self.low),
            Ipv4Addr::from(self.high),
            self.country
        )
    }
}

/// Validate a dataset country code: exactly two ASCII letters.
///
/// The code is not normalized; case is kept as written.
pub fn validate_country_code(code: &str) -> Result<()> {
    if code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(Error::InvalidCountryCode(code.to_string()))
    }
}
