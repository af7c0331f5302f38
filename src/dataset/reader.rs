//! Binary dataset reader with memory-mapping support.

use memmap2::Mmap;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

use super::format::*;
use crate::range::validate_country_code;
use crate::{AddressRange, Error, RangeTable, Result};

/// Decodes a binary dataset into a [`RangeTable`].
pub struct DatasetReader {
    header: DatasetHeader,
    table: RangeTable,
}

impl DatasetReader {
    /// Open and decode a binary dataset file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_bytes(&mmap)
    }

    /// Decode a binary dataset held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = DatasetHeader::decode(data)?;
        let flags = header.format_flags();

        let entries = &data[HEADER_SIZE..];
        let expected = header.entries_size();
        if entries.len() < expected {
            return Err(Error::Truncated {
                expected,
                actual: entries.len(),
            });
        }
        if entries.len() > expected {
            return Err(Error::TrailingBytes {
                expected,
                actual: entries.len(),
            });
        }

        if flags.contains(FormatFlags::CHECKSUMMED) {
            let mut hasher = Sha256::new();
            hasher.update(entries);
            if hasher.finalize()[..] != header.checksum[..] {
                return Err(Error::ChecksumMismatch);
            }
        }

        let mut ranges = Vec::with_capacity(header.range_count as usize);
        for chunk in entries.chunks_exact(ENTRY_SIZE) {
            let entry = RangeEntry::decode(chunk);
            let country = String::from_utf8_lossy(&entry.country).into_owned();
            validate_country_code(&country)?;
            ranges.push(AddressRange::new(entry.low, entry.high, country));
        }

        // VALIDATED is not trusted: lookups need sorted, disjoint entries.
        let table = RangeTable::new(ranges);
        table.validate()?;

        Ok(Self { header, table })
    }

    /// Get the file header.
    pub fn header(&self) -> &DatasetHeader {
        &self.header
    }

    /// Borrow the decoded table.
    pub fn table(&self) -> &RangeTable {
        &self.table
    }

    /// Take the decoded table.
    pub fn into_table(self) -> RangeTable {
        self.table
    }
}
