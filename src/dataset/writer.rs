//! Binary dataset writer.

use sha2::{Digest, Sha256};

use super::format::*;
use crate::range::validate_country_code;
use crate::{Error, RangeTable, Result};

/// Serializes a prepared [`RangeTable`] into the binary dataset format.
///
/// The writer does not sort or merge ranges; it refuses tables that break
/// the sorted and disjoint invariant.
pub struct DatasetWriter {
    buffer: Vec<u8>,
}

impl DatasetWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(64 * 1024),
        }
    }

    /// Write a table to the binary format.
    pub fn write(&mut self, table: &RangeTable) -> Result<Vec<u8>> {
        table.validate()?;
        let range_count =
            u32::try_from(table.len()).map_err(|_| Error::TooManyRanges(table.len()))?;

        self.buffer.clear();
        self.buffer.resize(HEADER_SIZE, 0);

        for range in table {
            validate_country_code(&range.country)?;
            let bytes = range.country.as_bytes();
            let entry = RangeEntry {
                low: range.low,
                high: range.high,
                country: [bytes[0], bytes[1]],
            };
            self.buffer.extend_from_slice(&entry.encode());
        }

        let mut hasher = Sha256::new();
        hasher.update(&self.buffer[HEADER_SIZE..]);
        let mut checksum = [0u8; 32];
        checksum.copy_from_slice(&hasher.finalize());

        let header = DatasetHeader {
            magic: MAGIC,
            version: FORMAT_VERSION,
            flags: (FormatFlags::CHECKSUMMED | FormatFlags::VALIDATED).bits(),
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs() as i64,
            range_count,
            reserved: 0,
            checksum,
        };
        self.buffer[..HEADER_SIZE].copy_from_slice(&header.encode());

        log::debug!(
            "encoded {} ranges into {} bytes",
            table.len(),
            self.buffer.len()
        );

        Ok(self.buffer.clone())
    }
}

impl Default for DatasetWriter {
    fn default() -> Self {
        Self::new()
    }
}
