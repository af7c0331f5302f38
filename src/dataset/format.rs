//! Binary dataset format constants and structures.

use bitflags::bitflags;

use crate::{Error, Result};

/// Magic bytes for identifying binary range datasets.
pub const MAGIC: [u8; 8] = *b"IP2CTRY\x01";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 64;

/// Size of one encoded range entry.
pub const ENTRY_SIZE: usize = 12;

bitflags! {
    /// Format flags for binary datasets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FormatFlags: u32 {
        /// Header carries a SHA-256 of the entry section.
        const CHECKSUMMED = 0b00000001;
        /// Entries were checked sorted and disjoint when written.
        /// Informational only; readers check again.
        const VALIDATED = 0b00000010;
    }
}

/// Binary dataset header (64 bytes).
///
/// Integers are little-endian on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetHeader {
    /// Magic bytes: "IP2CTRY\x01"
    pub magic: [u8; 8],
    /// Format version
    pub version: u32,
    /// Format flags
    pub flags: u32,
    /// Unix timestamp when the file was written
    pub timestamp: i64,
    /// Number of range entries
    pub range_count: u32,
    /// Reserved for future use
    pub reserved: u32,
    /// SHA-256 checksum of the entry section
    pub checksum: [u8; 32],
}

impl DatasetHeader {
    /// Create a new header with default values.
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            version: FORMAT_VERSION,
            flags: 0,
            timestamp: 0,
            range_count: 0,
            reserved: 0,
            checksum: [0; 32],
        }
    }

    /// Decode a header from the start of `data`.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::InvalidHeaderSize {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        }

        let mut magic = [0u8; 8];
        magic.copy_from_slice(&data[0..8]);
        let mut checksum = [0u8; 32];
        checksum.copy_from_slice(&data[32..64]);

        let header = Self {
            magic,
            version: u32::from_le_bytes([data[8], data[9], data[10], data[11]]),
            flags: u32::from_le_bytes([data[12], data[13], data[14], data[15]]),
            timestamp: i64::from_le_bytes([
                data[16], data[17], data[18], data[19], data[20], data[21], data[22], data[23],
            ]),
            range_count: u32::from_le_bytes([data[24], data[25], data[26], data[27]]),
            reserved: u32::from_le_bytes([data[28], data[29], data[30], data[31]]),
            checksum,
        };
        header.validate()?;
        Ok(header)
    }

    /// Encode the header into its 64-byte form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.magic);
        buf[8..12].copy_from_slice(&self.version.to_le_bytes());
        buf[12..16].copy_from_slice(&self.flags.to_le_bytes());
        buf[16..24].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[24..28].copy_from_slice(&self.range_count.to_le_bytes());
        buf[28..32].copy_from_slice(&self.reserved.to_le_bytes());
        buf[32..64].copy_from_slice(&self.checksum);
        buf
    }

    /// Validate the header magic and version.
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC {
            return Err(Error::InvalidMagic);
        }
        if self.version > FORMAT_VERSION {
            return Err(Error::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Get format flags.
    pub fn format_flags(&self) -> FormatFlags {
        FormatFlags::from_bits_truncate(self.flags)
    }

    /// Size in bytes of the entry section announced by this header.
    pub fn entries_size(&self) -> usize {
        self.range_count as usize * ENTRY_SIZE
    }
}

impl Default for DatasetHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Range entry (12 bytes).
///
/// ```text
/// low (u32 BE) | high (u32 BE) | country (2 ASCII bytes) | padding (2)
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeEntry {
    /// First address (big-endian on disk)
    pub low: u32,
    /// Last address (big-endian on disk)
    pub high: u32,
    /// 2-letter country code (ASCII)
    pub country: [u8; 2],
}

impl RangeEntry {
    /// Decode one entry from exactly [`ENTRY_SIZE`] bytes.
    pub fn decode(chunk: &[u8]) -> Self {
        Self {
            low: u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
            high: u32::from_be_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]),
            country: [chunk[8], chunk[9]],
        }
    }

    /// Encode this entry.
    pub fn encode(&self) -> [u8; ENTRY_SIZE] {
        let mut buf = [0u8; ENTRY_SIZE];
        buf[0..4].copy_from_slice(&self.low.to_be_bytes());
        buf[4..8].copy_from_slice(&self.high.to_be_bytes());
        buf[8..10].copy_from_slice(&self.country);
        buf
    }
}
