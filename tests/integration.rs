//! Integration tests for resolution and gate decisions.

use ip2country::{
    country_for_ip, AccessGate, AddressRange, CountryResolver, Decision, DenyReason, GateConfig,
    RangeTable, Whitelist, UNKNOWN,
};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::thread;

fn small_table() -> Arc<RangeTable> {
    Arc::new(RangeTable::new(vec![
        AddressRange::new(1, 10, "AA"),
        AddressRange::new(11, 20, "BB"),
        AddressRange::new(25, 30, "CC"),
    ]))
}

fn peer(address: u32) -> String {
    format!("{}:443", Ipv4Addr::from(address))
}

#[test]
fn test_reference_resolutions() {
    let resolver = CountryResolver::new(small_table());

    assert_eq!(resolver.resolve(5), Some("AA"));
    assert_eq!(resolver.resolve(10), Some("AA"));
    assert_eq!(resolver.resolve(11), Some("BB"));
    assert_eq!(resolver.resolve(21), None);
    assert_eq!(resolver.resolve(0), None);
    assert_eq!(resolver.resolve(31), None);
    assert_eq!(resolver.resolve(31).unwrap_or(UNKNOWN), "unknown");
}

#[test]
fn test_every_address_in_table_span() {
    let table = small_table();
    let resolver = CountryResolver::new(table.clone());

    for address in 0..=40u32 {
        let expected = table
            .iter()
            .find(|range| range.contains(address))
            .map(|range| range.country.as_str());
        assert_eq!(resolver.resolve(address), expected, "address {}", address);
    }
}

#[test]
fn test_gate_scenario() {
    let gate = AccessGate::new(Whitelist::from_codes(["AA"]), small_table());

    assert_eq!(gate.decide(Some(peer(5).as_str())), Decision::Allow);
    assert!(matches!(
        gate.decide(Some(peer(15).as_str())),
        Decision::Deny(DenyReason::NotWhitelisted { .. })
    ));
    assert!(matches!(
        gate.decide(Some("not-an-ip:443")),
        Decision::Deny(DenyReason::UnparseableAddress(_))
    ));
    assert!(matches!(
        gate.decide(Some(peer(22).as_str())),
        Decision::Deny(DenyReason::UnknownCountry(_))
    ));
    assert_eq!(
        gate.decide(None),
        Decision::Deny(DenyReason::MissingPeerAddress)
    );
}

#[test]
fn test_gate_from_yaml_config() {
    let config = GateConfig::from_yaml_str("whitelist:\n  - BB\n  - CC\n").unwrap();
    let gate = AccessGate::from_config(&config, small_table());

    assert!(!gate.decide(Some(peer(5).as_str())).is_allowed());
    assert!(gate.decide(Some(peer(15).as_str())).is_allowed());
    assert!(gate.decide(Some(peer(30).as_str())).is_allowed());
}

#[test]
fn test_boundary_call_matches_resolver() {
    let table = small_table();
    assert_eq!(country_for_ip("0.0.0.1", &table), Some("AA"));
    assert_eq!(country_for_ip("0.0.0.20", &table), Some("BB"));
    assert_eq!(country_for_ip("0.0.0.24", &table), None);
    assert_eq!(country_for_ip("bogus", &table), None);
}

#[test]
fn test_gate_shared_across_threads() {
    let gate = Arc::new(AccessGate::new(Whitelist::from_codes(["AA"]), small_table()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                (0..=40u32)
                    .filter(|address| gate.decide(Some(peer(*address).as_str())).is_allowed())
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 10);
    }
}

#[test]
fn test_large_table_resolution() {
    // One 256-address range at the start of every /16, the rest is gap.
    let ranges: Vec<AddressRange> = (0..65_536u32)
        .map(|i| {
            let low = i * 0x1_0000;
            let country = if i % 2 == 0 { "EV" } else { "OD" };
            AddressRange::new(low, low + 0xFF, country)
        })
        .collect();
    let table = RangeTable::checked(ranges).unwrap();
    let resolver = CountryResolver::new(Arc::new(table));

    assert_eq!(resolver.resolve(0), Some("EV"));
    assert_eq!(resolver.resolve(0xFF), Some("EV"));
    assert_eq!(resolver.resolve(0x100), None);
    assert_eq!(resolver.resolve(0x1_0000), Some("OD"));
    assert_eq!(resolver.resolve(0xFFFF_0000), Some("OD"));
    assert_eq!(resolver.resolve(0xFFFF_00FF), Some("OD"));
    assert_eq!(resolver.resolve(0xFFFF_0100), None);
    assert_eq!(resolver.resolve(u32::MAX), None);
}
