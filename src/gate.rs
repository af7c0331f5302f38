//! Country whitelist gate for inbound requests.

use ahash::AHashSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use thiserror::Error;

use crate::resolver::parse_ipv4;
use crate::{CountryResolver, GateConfig, RangeTable};

/// HTTP status for requests passed to the next handler.
pub const STATUS_OK: u16 = 200;

/// HTTP status for denied requests.
pub const STATUS_FORBIDDEN: u16 = 403;

/// Set of country codes allowed through the gate.
///
/// Codes are compared exactly as configured (case-sensitive).
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    countries: AHashSet<String>,
}

impl Whitelist {
    /// Build a whitelist from country codes. Duplicates collapse.
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            countries: codes.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a country code is allowed.
    pub fn contains(&self, country: &str) -> bool {
        self.countries.contains(country)
    }

    /// Number of distinct country codes.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Check if no country is allowed.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Why a request was denied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// Peer address absent or not in `host:port` form
    #[error("unable to determine IP address")]
    MissingPeerAddress,

    /// Host part is not an IPv4 literal
    #[error("unable to parse IP address {0}")]
    UnparseableAddress(String),

    /// Address not covered by any range
    #[error("unable to determine country for IP address {0}")]
    UnknownCountry(Ipv4Addr),

    /// Country resolved but not whitelisted
    #[error("request blocked from IP address {address} (country {country})")]
    NotWhitelisted { address: Ipv4Addr, country: String },
}

/// Outcome of [`AccessGate::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Pass the request to the next handler
    Allow,
    /// Reject the request
    Deny(DenyReason),
}

impl Decision {
    /// Check if the request may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// HTTP status the host pipeline should apply.
    pub fn status_code(&self) -> u16 {
        match self {
            Decision::Allow => STATUS_OK,
            Decision::Deny(_) => STATUS_FORBIDDEN,
        }
    }

    /// The denial reason, if any.
    pub fn reason(&self) -> Option<&DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(reason),
        }
    }
}

/// Allows or denies requests by the country of their peer address.
///
/// Built once and shared across request handlers; [`AccessGate::decide`]
/// only reads immutable state.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use ip2country::{AccessGate, AddressRange, RangeTable, Whitelist};
///
/// let table = Arc::new(RangeTable::new(vec![AddressRange::new(
///     0x0100_0000,
///     0x0100_00FF,
///     "AU",
/// )]));
/// let gate = AccessGate::new(Whitelist::from_codes(["AU"]), table);
///
/// assert!(gate.decide(Some("1.0.0.7:51000")).is_allowed());
/// assert!(!gate.decide(Some("8.8.8.8:53")).is_allowed());
/// assert!(!gate.decide(None).is_allowed());
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate {
    whitelist: Whitelist,
    resolver: CountryResolver,
}

impl AccessGate {
    /// Create a gate from a whitelist and a shared range table.
    pub fn new(whitelist: Whitelist, table: Arc<RangeTable>) -> Self {
        Self {
            whitelist,
            resolver: CountryResolver::new(table),
        }
    }

    /// Create a gate from its configuration.
    pub fn from_config(config: &GateConfig, table: Arc<RangeTable>) -> Self {
        let whitelist = Whitelist::from_codes(config.whitelist.iter().cloned());
        if whitelist.is_empty() {
            log::warn!("ip2country: whitelist is empty, every request will be denied");
        }
        Self::new(whitelist, table)
    }

    /// The configured whitelist.
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// The resolver used by this gate.
    pub fn resolver(&self) -> &CountryResolver {
        &self.resolver
    }

    /// Decide whether a request from `peer` (`host:port`) may proceed.
    ///
    /// Every denial is logged with its reason.
    pub fn decide(&self, peer: Option<&str>) -> Decision {
        let decision = self.evaluate(peer);
        match &decision {
            Decision::Allow => log::debug!("ip2country: request allowed from {:?}", peer),
            Decision::Deny(reason) => log::warn!("ip2country: {}", reason),
        }
        decision
    }

    fn evaluate(&self, peer: Option<&str>) -> Decision {
        let host = match peer.and_then(split_host_port) {
            Some(host) => host,
            None => return Decision::Deny(DenyReason::MissingPeerAddress),
        };

        let address = match parse_ipv4(host) {
            Some(address) => address,
            None => return Decision::Deny(DenyReason::UnparseableAddress(host.to_string())),
        };

        let country = match self.resolver.resolve(address) {
            Some(country) => country,
            None => return Decision::Deny(DenyReason::UnknownCountry(Ipv4Addr::from(address))),
        };

        if self.whitelist.contains(country) {
            Decision::Allow
        } else {
            Decision::Deny(DenyReason::NotWhitelisted {
                address: Ipv4Addr::from(address),
                country: country.to_string(),
            })
        }
    }
}

/// Split a `host:port` peer address and return the host.
///
/// IPv6 hosts must be bracketed (`[::1]:443`). The port must be present but
/// is not interpreted.
pub fn split_host_port(peer: &str) -> Option<&str> {
    if let Some(rest) = peer.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        tail.strip_prefix(':')?;
        return if host.is_empty() { None } else { Some(host) };
    }

    let (host, _port) = peer.rsplit_once(':')?;
    // An unbracketed host with a colon is an IPv6 literal missing brackets.
    if host.is_empty() || host.contains(':') {
        return None;
    }
    Some(host)
}
