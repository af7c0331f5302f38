//! Error types for ip2country.

use thiserror::Error;

/// Error type for dataset loading and configuration.
///
/// Resolution itself never fails; a request that cannot be resolved is
/// denied through [`crate::DenyReason`] instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid binary file magic bytes
    #[error("invalid magic bytes: expected IP2CTRY header")]
    InvalidMagic,

    /// Unsupported binary format version
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u32),

    /// Checksum mismatch
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// Invalid header size
    #[error("invalid header size: expected {expected}, got {actual}")]
    InvalidHeaderSize { expected: usize, actual: usize },

    /// Entry section shorter than the header announces
    #[error("dataset truncated: expected {expected} bytes of entries, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// Entry section longer than the header announces
    #[error("dataset has trailing data: expected {expected} bytes of entries, got {actual}")]
    TrailingBytes { expected: usize, actual: usize },

    /// Table too large for the binary format
    #[error("too many ranges for the binary format: {0}")]
    TooManyRanges(usize),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed line in a text dataset
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// Invalid country code
    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    /// Range with `low > high`
    #[error("range {index} is inverted: {low} > {high}")]
    InvalidRange { index: usize, low: u32, high: u32 },

    /// Range that overlaps or precedes its predecessor
    #[error("range {index} overlaps or precedes the previous range")]
    UnsortedRanges { index: usize },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for ip2country operations.
pub type Result<T> = std::result::Result<T, Error>;
