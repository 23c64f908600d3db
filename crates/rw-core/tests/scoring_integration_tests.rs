//! Integration tests for the full scoring pipeline.
//!
//! These tests exercise load → evaluate → aggregate → report end to end,
//! including the loader defaulting/coercion behavior and the default-policy
//! fallback.

use rw_core::engine::{aggregate, evaluate};
use rw_core::models::{Asset, Event};
use rw_core::policy::Policy;
use rw_core::report::RiskReport;
use rw_core::store::{AssetStore, EventStore};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

fn canonical_store() -> AssetStore {
    let mut store = AssetStore::new();
    store.insert(
        Asset::new("srv-1")
            .with_type("vm")
            .with_tags(vec!["prod".to_string(), "pci".to_string()])
            .with_criticality(0.9),
    );
    store
}

fn canonical_event() -> Event {
    Event::new("e1", "srv-1", 1_700_000_000)
        .with_type("alert")
        .with_severity(0.8)
        .with_labels(vec!["exfil".to_string()])
}

#[test]
fn default_policy_scores_canonical_scenario_exactly() {
    let store = canonical_store();
    let events = vec![canonical_event()];
    let policy = Policy::default_policy();

    let results = evaluate(&store, &events, &policy);

    assert_eq!(results.len(), 1);
    let result = &results[0];

    // sev-asset: 0.8*60 + 0.9*50 = 93; label-bonus: 40 (exfil);
    // tag-bonus: 10 + 20 (prod) + 25 (pci) = 55. Total 188.
    assert_eq!(result.score, 188.0);
    assert_eq!(result.applied.len(), 3);
    assert_eq!(result.applied[0].rule_id, "sev-asset");
    assert_eq!(result.applied[0].score, 93.0);
    assert_eq!(result.applied[1].rule_id, "label-bonus");
    assert_eq!(result.applied[1].score, 40.0);
    assert_eq!(result.applied[2].rule_id, "tag-bonus");
    assert_eq!(result.applied[2].score, 55.0);
}

#[test]
fn unknown_asset_events_never_surface_anywhere() {
    let store = canonical_store();
    let events = vec![
        canonical_event(),
        Event::new("e2", "no-such-asset", 0).with_type("alert"),
    ];
    let policy = Policy::default_policy();

    let results = evaluate(&store, &events, &policy);
    let aggregates = aggregate(&results);

    assert_eq!(results.len(), 1);
    assert!(results.iter().all(|r| r.event_id != "e2"));
    assert_eq!(aggregates.len(), 1);
    assert!(aggregates.contains_key("srv-1"));
}

#[test]
fn evaluate_twice_yields_identical_results() {
    let store = canonical_store();
    let events = vec![
        canonical_event(),
        Event::new("e2", "srv-1", 5)
            .with_type("anomaly")
            .with_severity(0.3),
    ];
    let policy = Policy::default_policy();

    let first = serde_json::to_string(&evaluate(&store, &events, &policy)).unwrap();
    let second = serde_json::to_string(&evaluate(&store, &events, &policy)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn loaders_apply_defaults_and_coercions() {
    let assets_file = write_temp(
        r#"{
            "assets": [
                {"id": "srv-1", "type": "vm", "tags": ["prod"], "criticality": "0.9"},
                {"name": "anonymous"},
                {"id": "srv-2", "criticality": {"nested": true}}
            ]
        }"#,
    );
    let events_file = write_temp(
        r#"{
            "events": [
                {"id": "e1", "ts": 100, "asset": "srv-1", "type": "alert", "severity": "bad"},
                {"asset": "srv-1"}
            ]
        }"#,
    );

    let assets = AssetStore::load(assets_file.path()).expect("load assets");
    let events = EventStore::load(events_file.path()).expect("load events");

    assert_eq!(assets.len(), 3);
    let srv1 = assets.get("srv-1").unwrap();
    assert_eq!(srv1.criticality, 0.9); // numeric string parses
    let srv2 = assets.get("srv-2").unwrap();
    assert_eq!(srv2.criticality, 0.0); // non-numeric degrades to zero

    assert_eq!(events.len(), 2);
    assert_eq!(events.all()[0].severity, 0.0); // non-numeric degrades to zero
    assert_eq!(events.all()[1].severity, 0.5); // absent takes the default
    assert!(!events.all()[1].id.is_empty());
}

#[test]
fn malformed_policy_falls_back_to_default() {
    let policy_file = write_temp("{ this is not json");
    let policy = Policy::load_or_default(policy_file.path());

    assert_eq!(policy.id, "default-policy");
    assert_eq!(policy.rules.len(), 3);
}

#[test]
fn valid_policy_file_loads_with_rule_defaults() {
    let policy_file = write_temp(
        r#"{
            "id": "custom",
            "name": "Custom",
            "rules": [
                {"id": "only-alerts", "when": {"event_type": ["alert"]}, "calc": {"base": 7}}
            ]
        }"#,
    );

    let policy = Policy::load(policy_file.path()).expect("load policy");

    assert_eq!(policy.id, "custom");
    assert_eq!(policy.version, "1.0");
    assert_eq!(policy.rules.len(), 1);
    assert_eq!(policy.rules[0].weight, 1.0);

    let store = canonical_store();
    let results = evaluate(&store, &[canonical_event()], &policy);
    assert_eq!(results[0].score, 7.0);
}

#[test]
fn report_summary_orders_by_max_then_avg() {
    let mut store = AssetStore::new();
    store.insert(Asset::new("asset-a"));
    store.insert(Asset::new("asset-b"));

    // asset-a: scores 10, 10 (max 10, avg 10); asset-b: 10, 0 (max 10, avg 5).
    let policy_file = write_temp(
        r#"{
            "id": "p",
            "rules": [{"id": "sev", "calc": {"mul_severity": 10}}]
        }"#,
    );
    let policy = Policy::load(policy_file.path()).expect("load policy");
    let events = vec![
        Event::new("e1", "asset-a", 1).with_severity(1.0),
        Event::new("e2", "asset-a", 2).with_severity(1.0),
        Event::new("e3", "asset-b", 3).with_severity(1.0),
        Event::new("e4", "asset-b", 4).with_severity(0.0),
    ];

    let results = evaluate(&store, &events, &policy);
    let report = RiskReport::build(&store, results);

    assert_eq!(report.summary.len(), 2);
    assert_eq!(report.summary[0].asset, "asset-a");
    assert_eq!(report.summary[1].asset, "asset-b");
    assert_eq!(report.summary[0].max, report.summary[1].max);
    assert!(report.summary[0].avg > report.summary[1].avg);
    assert_eq!(report.details.len(), 4);
}

#[test]
fn aggregates_match_percentile_contract() {
    let mut store = AssetStore::new();
    store.insert(Asset::new("a"));
    let policy_file = write_temp(
        r#"{"id": "p", "rules": [{"id": "sev", "calc": {"mul_severity": 10}}]}"#,
    );
    let policy = Policy::load(policy_file.path()).expect("load policy");

    // Scores 10, 20, 30, 40.
    let events: Vec<Event> = (1..=4)
        .map(|i| Event::new(format!("e{i}"), "a", i as i64).with_severity(i as f64))
        .collect();

    let results = evaluate(&store, &events, &policy);
    let aggregates = aggregate(&results);
    let agg = &aggregates["a"];

    assert_eq!(agg.count, 4);
    assert_eq!(agg.sum, 100.0);
    assert_eq!(agg.avg, 25.0);
    assert_eq!(agg.max, 40.0);
    // k = 3 * 0.95 = 2.85 → 30*0.15 + 40*0.85 = 38.5
    assert!((agg.p95 - 38.5).abs() < 1e-9);
    // k = 3 * 0.99 = 2.97 → 30*0.03 + 40*0.97 = 39.7
    assert!((agg.p99 - 39.7).abs() < 1e-9);
}
