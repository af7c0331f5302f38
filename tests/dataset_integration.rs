//! Integration tests for dataset files feeding the gate.

use ip2country::dataset::{self, DatasetReader, DatasetWriter};
use ip2country::{AccessGate, Decision, Error, GateConfig, RangeTable};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

const SAMPLE: &str = "\
# low,high,country
1.0.0.0,1.0.0.255,AU
1.0.1.0,1.0.3.255,CN
1.0.4.0/22,AU
2.16.0.0/13,DE
8.8.8.0,8.8.8.255,US
";

#[test]
fn test_text_to_binary_to_gate() {
    let dir = tempdir().unwrap();
    let text_path = dir.path().join("ranges.txt");
    let bin_path = dir.path().join("ranges.bin.gz");
    fs::write(&text_path, SAMPLE).unwrap();

    let table = dataset::load(&text_path).unwrap();
    assert_eq!(table.len(), 5);
    dataset::save(&table, &bin_path).unwrap();

    let loaded = Arc::new(dataset::load(&bin_path).unwrap());
    assert_eq!(*loaded, table);

    let config_path = dir.path().join("gate.yml");
    fs::write(&config_path, "whitelist: [DE, US]\ndataset: ranges.bin.gz\n").unwrap();
    let config = GateConfig::load(&config_path).unwrap();
    assert_eq!(config.dataset.as_deref(), Some(bin_path.as_path()));

    let gate = AccessGate::from_config(&config, loaded);
    assert_eq!(gate.decide(Some("8.8.8.8:53")), Decision::Allow);
    assert_eq!(gate.decide(Some("2.23.255.1:80")), Decision::Allow);
    assert!(!gate.decide(Some("1.0.2.1:80")).is_allowed());
    assert!(!gate.decide(Some("9.9.9.9:80")).is_allowed());
}

#[test]
fn test_shipped_dataset_invariants() {
    let table = dataset::TextParser::parse_str(SAMPLE).unwrap();
    assert!(table.validate().is_ok());
    for pair in table.as_slice().windows(2) {
        assert!(pair[0].low <= pair[0].high);
        assert!(pair[0].high < pair[1].low);
    }
}

#[test]
fn test_binary_file_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ranges.bin");
    let table = dataset::TextParser::parse_str(SAMPLE).unwrap();
    fs::write(&path, DatasetWriter::new().write(&table).unwrap()).unwrap();

    let reader = DatasetReader::open(&path).unwrap();
    assert_eq!(reader.header().range_count, 5);
    assert_eq!(reader.into_table(), table);
}

#[test]
fn test_corrupted_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ranges.bin");
    let table = dataset::TextParser::parse_str(SAMPLE).unwrap();
    let mut data = DatasetWriter::new().write(&table).unwrap();
    let last = data.len() - 3;
    data[last] ^= 0x01;
    fs::write(&path, data).unwrap();

    assert!(matches!(dataset::load(&path), Err(Error::ChecksumMismatch)));
}

#[test]
fn test_overlapping_text_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    fs::write(&path, "1.0.0.0/24,AU\n1.0.0.128,1.0.1.0,CN\n").unwrap();

    assert!(matches!(
        dataset::load(&path),
        Err(Error::UnsortedRanges { index: 1 })
    ));
}

#[test]
fn test_empty_dataset_denies_everything() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    fs::write(&path, "# no ranges\n").unwrap();

    let table: RangeTable = dataset::load(&path).unwrap();
    assert!(table.is_empty());

    let gate = AccessGate::from_config(&GateConfig::new(["AU"]), Arc::new(table));
    assert!(!gate.decide(Some("1.0.0.1:80")).is_allowed());
}
