//! ip2country - A country whitelist gate backed by a sorted IPv4 range table.
//!
//! This crate maps a client's IPv4 address to a country code and decides
//! whether the request may pass, based on a configured list of countries.
//!
//! # Features
//!
//! - **Range table**: immutable, sorted, disjoint `(low, high, country)`
//!   intervals, shared read-only across threads
//! - **Binary search resolution**: `O(log n)` lower-bound lookup, gaps and
//!   out-of-table addresses resolve to unknown
//! - **Access gate**: `host:port` peer address in, allow or deny out, with
//!   every denial logged
//! - **Datasets**: text and checksummed binary encodings, optional gzip
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use ip2country::{AccessGate, AddressRange, Decision, GateConfig, RangeTable};
//!
//! let table = Arc::new(RangeTable::new(vec![
//!     AddressRange::new(1, 10, "AA"),
//!     AddressRange::new(11, 20, "BB"),
//! ]));
//!
//! let config = GateConfig::from_yaml_str("whitelist: [AA]").unwrap();
//! let gate = AccessGate::from_config(&config, table);
//!
//! assert_eq!(gate.decide(Some("0.0.0.5:443")), Decision::Allow);
//! assert!(!gate.decide(Some("0.0.0.15:443")).is_allowed());
//! ```
//!
//! Loading a dataset from disk:
//!
//! ```ignore
//! let table = Arc::new(ip2country::dataset::load("/var/lib/ip2country/ranges.bin.gz")?);
//! ```

mod config;
mod error;
mod gate;
mod range;
mod resolver;
mod table;

pub mod dataset;

// Re-export core types
pub use error::{Error, Result};
pub use range::{validate_country_code, AddressRange};
pub use table::RangeTable;

// Re-export resolution
pub use resolver::{country_for_ip, parse_ipv4, CountryResolver, UNKNOWN};

// Re-export gate types
pub use config::GateConfig;
pub use gate::{
    split_host_port, AccessGate, Decision, DenyReason, Whitelist, STATUS_FORBIDDEN, STATUS_OK,
};
