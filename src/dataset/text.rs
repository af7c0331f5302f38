//! Text dataset format.
//!
//! One range per line, `#` starts a comment:
//!
//! ```text
//! # low,high,country
//! 16777216,16777471,AU
//! 1.0.1.0,1.0.3.255,CN
//! 1.0.4.0/22,AU
//! ```
//!
//! Bounds are decimal `u32` values or dotted IPv4 addresses; a CIDR block
//! stands for its whole network. Country codes are kept as written.

use ipnet::Ipv4Net;
use std::fmt::Write as _;
use std::io::{BufRead, BufReader, Read};
use std::net::Ipv4Addr;

use crate::range::validate_country_code;
use crate::{AddressRange, Error, RangeTable, Result};

/// Text dataset parser.
pub struct TextParser;

impl TextParser {
    /// Parse ranges from a reader.
    ///
    /// The table is returned as found; ordering is checked by the caller.
    pub fn parse<R: Read>(reader: R) -> Result<RangeTable> {
        let mut ranges = Vec::new();

        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            if let Some(range) = parse_line(&line, index + 1)? {
                ranges.push(range);
            }
        }

        Ok(RangeTable::new(ranges))
    }

    /// Parse ranges from a string.
    pub fn parse_str(content: &str) -> Result<RangeTable> {
        Self::parse(content.as_bytes())
    }
}

/// Render a table in the text format, dotted bounds.
pub fn render_text(table: &RangeTable) -> String {
    let mut out = String::with_capacity(table.len() * 32);
    for range in table {
        let _ = writeln!(
            out,
            "{},{},{}",
            Ipv4Addr::from(range.low),
            Ipv4Addr::from(range.high),
            range.country
        );
    }
    out
}

fn parse_line(line: &str, number: usize) -> Result<Option<AddressRange>> {
    let line = match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    };
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let (low, high, country) = match fields.as_slice() {
        [cidr, country] => {
            let net: Ipv4Net = cidr
                .parse()
                .map_err(|_| parse_error(number, format!("invalid CIDR block {:?}", cidr)))?;
            (u32::from(net.network()), u32::from(net.broadcast()), *country)
        }
        [low, high, country] => (
            parse_bound(low, number)?,
            parse_bound(high, number)?,
            *country,
        ),
        _ => {
            return Err(parse_error(
                number,
                format!("expected 2 or 3 fields, got {}", fields.len()),
            ))
        }
    };

    validate_country_code(country).map_err(|_| {
        parse_error(number, format!("invalid country code {:?}", country))
    })?;
    if low > high {
        return Err(parse_error(number, format!("low bound {} above high bound {}", low, high)));
    }

    Ok(Some(AddressRange::new(low, high, country)))
}

fn parse_bound(field: &str, number: usize) -> Result<u32> {
    if let Ok(value) = field.parse::<u32>() {
        return Ok(value);
    }
    field
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| parse_error(number, format!("invalid address {:?}", field)))
}

fn parse_error(line: usize, reason: String) -> Error {
    Error::Parse { line, reason }
}
