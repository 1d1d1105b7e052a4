//! Architectural Contract Test: Record Classification
//!
//! This test verifies that only address and alias records are inspected,
//! and that records pointing into a redirect-service block are excluded
//! from both the offending list and the reverse index.
//!
//! Constraints verified:
//! - Other record kinds → never fetched
//! - Redirect addresses → neither offending nor indexed
//! - Alias targets and addresses → indexed separately, zones in first-seen order

mod common;

use common::*;
use dyncheck_core::traits::RecordData;
use dyncheck_core::{MemoryCheckpointStore, ZoneOutcome};

#[tokio::test]
async fn other_record_kinds_are_never_fetched() {
    let provider = ScriptedProvider::new()
        .zone("example.com", 5)
        .other("example.com", "MX", "example.com", 10)
        .other("example.com", "TXT", "example.com", 10)
        .other("example.com", "AAAA", "v6.example.com", 10)
        .alias("example.com", "www.example.com", "lb.example.net", 3600);
    let store = MemoryCheckpointStore::new();

    let result = runner(&provider, &store, &minimal_config(300))
        .run()
        .await
        .unwrap();

    assert_eq!(provider.get_record_calls(), 1, "only the alias is fetched");
    assert!(provider.fetched_records()[0].starts_with("/REST/CNAMERecord/"));
    assert!(result.offending_records.is_empty());

    match &result.zones[0] {
        ZoneOutcome::Scanned(stats) => {
            assert_eq!(stats.records_ignored, 3);
            assert_eq!(stats.records_checked, 1);
        }
        other => panic!("expected scanned zone, got {:?}", other),
    }
}

#[tokio::test]
async fn redirect_addresses_are_excluded_everywhere() {
    let provider = ScriptedProvider::new()
        .zone("example.com", 5)
        .address("example.com", "old.example.com", "216.146.46.10", 30);
    let store = MemoryCheckpointStore::new();

    let result = runner(&provider, &store, &minimal_config(300))
        .run()
        .await
        .unwrap();

    assert!(result.offending_records.is_empty());
    assert!(result.reverse_index.addresses.is_empty());
    assert_eq!(store.snapshot().await.serial("example.com"), Some(5));
}

#[tokio::test]
async fn redirect_blocks_come_from_configuration() {
    let provider = ScriptedProvider::new()
        .zone("example.com", 5)
        .address("example.com", "parked.example.com", "192.0.2.17", 30)
        .address("example.com", "legacy.example.com", "216.146.46.10", 30);
    let store = MemoryCheckpointStore::new();
    let mut config = minimal_config(300);
    config.policy.redirect_blocks = vec!["192.0.2.0/24".to_string()];

    let result = runner(&provider, &store, &config).run().await.unwrap();

    let names: Vec<_> = result
        .offending_records
        .iter()
        .map(|r| r.fqdn.as_str())
        .collect();
    assert_eq!(names, vec!["legacy.example.com"]);
    assert!(result.reverse_index.addresses.zones_for("192.0.2.17").is_none());
}

#[tokio::test]
async fn reverse_index_adds_one_entry_per_referencing_record() {
    let provider = ScriptedProvider::new()
        .zone("a.example", 1)
        .alias("a.example", "www.a.example", "cdn.example.net", 3600)
        .address("a.example", "api.a.example", "10.0.0.5", 3600)
        .zone("b.example", 1)
        .alias("b.example", "www.b.example", "cdn.example.net", 3600)
        .alias("b.example", "img.b.example", "cdn.example.net", 3600);
    let store = MemoryCheckpointStore::new();

    let result = runner(&provider, &store, &minimal_config(300))
        .run()
        .await
        .unwrap();

    assert_eq!(
        result.reverse_index.aliases.snapshot(),
        vec![(
            "cdn.example.net".to_string(),
            vec![
                "a.example".to_string(),
                "b.example".to_string(),
                "b.example".to_string()
            ]
        )]
    );
    assert_eq!(
        result.reverse_index.addresses.snapshot(),
        vec![("10.0.0.5".to_string(), vec!["a.example".to_string()])]
    );
}

#[tokio::test]
async fn payload_kind_mismatch_blocks_checkpoint() {
    let provider = ScriptedProvider::new().zone("example.com", 8).record(
        "example.com",
        "A",
        "odd.example.com",
        3600,
        RecordData::Alias("elsewhere.example.net".to_string()),
    );
    let store = MemoryCheckpointStore::new();

    let result = runner(&provider, &store, &minimal_config(300))
        .run()
        .await
        .unwrap();

    assert!(result.offending_records.is_empty());
    assert!(!store.snapshot().await.contains("example.com"));
}
