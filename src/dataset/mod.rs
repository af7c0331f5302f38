//! Range dataset loading and serialization.
//!
//! Datasets come in two encodings, detected by content:
//!
//! - **text**: one `low,high,CC` or `cidr,CC` line per range (see [`text`])
//! - **binary**: fixed-size header and entries, checksummed
//!
//! ```text
//! +------------------+
//! |     HEADER       |  64 bytes (magic, version, flags, count, SHA-256)
//! +------------------+
//! |     ENTRIES      |  12 bytes each: low BE, high BE, country, padding
//! +------------------+
//! ```
//!
//! Either encoding may be gzip compressed; files ending in `.gz` are
//! decompressed before detection. Loaded tables are always checked sorted
//! and disjoint.

mod format;
mod reader;
pub mod text;
mod writer;


pub use format::*;
pub use reader::DatasetReader;
pub use text::{render_text, TextParser};
pub use writer::DatasetWriter;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::{RangeTable, Result};

/// Load a dataset file into a validated table.
pub fn load(path: impl AsRef<Path>) -> Result<RangeTable> {
    let path = path.as_ref();

    let table = if is_gzip_path(path) {
        let mut decoder = GzDecoder::new(File::open(path)?);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;
        load_bytes(&data)?
    } else if has_magic(path)? {
        DatasetReader::open(path)?.into_table()
    } else {
        load_text(&fs::read(path)?)?
    };

    log::info!("loaded {} ranges from {:?}", table.len(), path);
    Ok(table)
}

/// Load a dataset held in memory, binary or text.
pub fn load_bytes(data: &[u8]) -> Result<RangeTable> {
    if data.starts_with(&MAGIC) {
        Ok(DatasetReader::from_bytes(data)?.into_table())
    } else {
        load_text(data)
    }
}

/// Write a table in the binary format, gzip compressed if `path` ends in `.gz`.
pub fn save(table: &RangeTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let data = DatasetWriter::new().write(table)?;
    write_atomic(path, &data)?;
    log::info!("wrote {} ranges to {:?}", table.len(), path);
    Ok(())
}

/// Write a table in the text format, gzip compressed if `path` ends in `.gz`.
pub fn save_text(table: &RangeTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    table.validate()?;
    write_atomic(path, render_text(table).as_bytes())?;
    log::info!("wrote {} ranges as text to {:?}", table.len(), path);
    Ok(())
}

/// Write `data` next to `path` and rename it into place.
///
/// The temporary file is removed if any step fails.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);
    let result = write_file(&temp_path, data, is_gzip_path(path))
        .and_then(|()| fs::rename(&temp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

fn write_file(path: &Path, data: &[u8], gzip: bool) -> io::Result<()> {
    let mut file = File::create(path)?;
    if gzip {
        let mut encoder = GzEncoder::new(&mut file, Compression::default());
        encoder.write_all(data)?;
        encoder.finish()?;
    } else {
        file.write_all(data)?;
    }
    file.sync_all()
}

// `ranges.bin.gz` -> `ranges.bin.gz.tmp`, so sibling outputs never share a temp file.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn load_text(data: &[u8]) -> Result<RangeTable> {
    let table = TextParser::parse(data)?;
    table.validate()?;
    Ok(table)
}

fn has_magic(path: &Path) -> Result<bool> {
    let mut prefix = [0u8; 8];
    let mut file = File::open(path)?;
    let mut filled = 0;
    while filled < prefix.len() {
        let n = file.read(&mut prefix[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled == prefix.len() && prefix == MAGIC)
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}
