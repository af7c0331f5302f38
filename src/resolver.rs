//! IPv4 to country resolution over a [`RangeTable`].

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use crate::{AddressRange, RangeTable};

/// Textual form of an unresolved country.
pub const UNKNOWN: &str = "unknown";

/// Resolves IPv4 addresses to country codes with a lower-bound binary search.
///
/// The resolver only reads its table, so a single instance (or many clones
/// sharing the same `Arc`) can serve any number of threads.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use ip2country::{AddressRange, CountryResolver, RangeTable};
///
/// let table = RangeTable::new(vec![
///     AddressRange::new(1, 10, "AA"),
///     AddressRange::new(11, 20, "BB"),
/// ]);
/// let resolver = CountryResolver::new(Arc::new(table));
/// assert_eq!(resolver.resolve(10), Some("AA"));
/// assert_eq!(resolver.resolve(21), None);
/// ```
#[derive(Debug, Clone)]
pub struct CountryResolver {
    table: Arc<RangeTable>,
}

impl CountryResolver {
    /// Create a resolver over a shared table.
    pub fn new(table: Arc<RangeTable>) -> Self {
        Self { table }
    }

    /// The table this resolver searches.
    pub fn table(&self) -> &RangeTable {
        &self.table
    }

    /// Find the range owning `address`.
    pub fn lookup(&self, address: u32) -> Option<&AddressRange> {
        self.table.find(address)
    }

    /// Resolve an address to its country code, `None` if unknown.
    pub fn resolve(&self, address: u32) -> Option<&str> {
        self.lookup(address).map(|range| range.country.as_str())
    }

    /// Resolve an IPv4 address.
    pub fn resolve_ip(&self, ip: Ipv4Addr) -> Option<&str> {
        self.resolve(u32::from(ip))
    }

    /// Resolve a textual IP address.
    ///
    /// Unparseable input and non IPv4 addresses resolve to `None`.
    pub fn resolve_str(&self, ip: &str) -> Option<&str> {
        parse_ipv4(ip).and_then(|address| self.resolve(address))
    }
}

/// Resolve a textual IP address against `table`.
pub fn country_for_ip<'a>(ip: &str, table: &'a RangeTable) -> Option<&'a str> {
    let address = parse_ipv4(ip)?;
    table.find(address).map(|range| range.country.as_str())
}

/// Parse an IP literal into the big-endian `u32` form used by the table.
///
/// Accepts IPv4 literals and IPv4-mapped IPv6 literals (`::ffff:a.b.c.d`).
pub fn parse_ipv4(ip: &str) -> Option<u32> {
    match ip.parse::<IpAddr>().ok()? {
        IpAddr::V4(v4) => Some(u32::from(v4)),
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(u32::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> CountryResolver {
        CountryResolver::new(Arc::new(RangeTable::new(vec![
            AddressRange::new(1, 10, "AA"),
            AddressRange::new(11, 20, "BB"),
            AddressRange::new(25, 30, "CC"),
        ])))
    }

    #[test]
    fn test_resolve_inside_range() {
        let r = resolver();
        assert_eq!(r.resolve(5), Some("AA"));
        assert_eq!(r.resolve(15), Some("BB"));
        assert_eq!(r.resolve(27), Some("CC"));
    }

    #[test]
    fn test_resolve_bounds_inclusive() {
        let r = resolver();
        assert_eq!(r.resolve(1), Some("AA"));
        assert_eq!(r.resolve(10), Some("AA"));
        assert_eq!(r.resolve(11), Some("BB"));
        assert_eq!(r.resolve(20), Some("BB"));
        assert_eq!(r.resolve(25), Some("CC"));
        assert_eq!(r.resolve(30), Some("CC"));
    }

    #[test]
    fn test_resolve_gap_is_unknown() {
        let r = resolver();
        for address in 21..25 {
            assert_eq!(r.resolve(address), None);
        }
    }

    #[test]
    fn test_resolve_outside_table() {
        let r = resolver();
        assert_eq!(r.resolve(0), None);
        assert_eq!(r.resolve(31), None);
        assert_eq!(r.resolve(u32::MAX), None);
    }

    #[test]
    fn test_resolve_empty_table() {
        let r = CountryResolver::new(Arc::new(RangeTable::default()));
        assert_eq!(r.resolve(0), None);
        assert_eq!(r.resolve(u32::MAX), None);
    }

    #[test]
    fn test_resolve_full_address_space() {
        let r = CountryResolver::new(Arc::new(RangeTable::new(vec![
            AddressRange::new(0, 0x7FFF_FFFF, "LO"),
            AddressRange::new(0x8000_0000, u32::MAX, "HI"),
        ])));
        assert_eq!(r.resolve(0), Some("LO"));
        assert_eq!(r.resolve(0x7FFF_FFFF), Some("LO"));
        assert_eq!(r.resolve(0x8000_0000), Some("HI"));
        assert_eq!(r.resolve(u32::MAX), Some("HI"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let r = resolver();
        for address in 0..40 {
            assert_eq!(r.resolve(address), r.resolve(address));
        }
    }

    #[test]
    fn test_lookup_returns_range() {
        let r = resolver();
        let range = r.lookup(12).unwrap();
        assert_eq!((range.low, range.high), (11, 20));
        assert!(r.lookup(22).is_none());
    }

    #[test]
    fn test_resolve_str() {
        let r = CountryResolver::new(Arc::new(RangeTable::new(vec![AddressRange::from_addrs(
            Ipv4Addr::new(1, 0, 0, 0),
            Ipv4Addr::new(1, 0, 0, 255),
            "AU",
        )])));
        assert_eq!(r.resolve_str("1.0.0.1"), Some("AU"));
        assert_eq!(r.resolve_str("::ffff:1.0.0.1"), Some("AU"));
        assert_eq!(r.resolve_str("1.0.1.0"), None);
        assert_eq!(r.resolve_str("not an ip"), None);
        assert_eq!(r.resolve_ip(Ipv4Addr::new(1, 0, 0, 255)), Some("AU"));
    }

    #[test]
    fn test_country_for_ip_matches_resolver() {
        let r = resolver();
        for address in 0..40u32 {
            let text = Ipv4Addr::from(address).to_string();
            assert_eq!(country_for_ip(&text, r.table()), r.resolve(address));
        }
        assert_eq!(country_for_ip("", r.table()), None);
        assert_eq!(country_for_ip(" 0.0.0.5", r.table()), None);
    }

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(parse_ipv4("1.2.3.4"), Some(0x0102_0304));
        assert_eq!(parse_ipv4("255.255.255.255"), Some(u32::MAX));
        assert_eq!(parse_ipv4(" 1.2.3.4"), None);
        assert_eq!(parse_ipv4("1.2.3.4 "), None);
        assert_eq!(parse_ipv4("::ffff:10.0.0.1"), Some(0x0A00_0001));
        assert_eq!(parse_ipv4("2001:db8::1"), None);
        assert_eq!(parse_ipv4("::1"), None);
        assert_eq!(parse_ipv4("256.0.0.1"), None);
        assert_eq!(parse_ipv4("1.2.3"), None);
        assert_eq!(parse_ipv4(""), None);
    }
}
