//! Built-in sample data for the `gen` command.
//!
//! A small but representative inventory: production and development assets
//! with varying criticality, and one event per alert class.

use anyhow::{Context, Result};
use chrono::Utc;
use rw_core::models::{Asset, Event};
use std::path::Path;

/// Returns the sample asset inventory.
pub fn sample_assets() -> Vec<Asset> {
    vec![
        Asset::new("srv-1")
            .with_type("vm")
            .with_tags(vec!["prod".to_string(), "pci".to_string()])
            .with_criticality(0.9),
        Asset::new("srv-2")
            .with_type("vm")
            .with_tags(vec!["dev".to_string()])
            .with_criticality(0.4),
        Asset::new("db-1")
            .with_type("db")
            .with_tags(vec!["prod".to_string(), "pii".to_string()])
            .with_criticality(0.95),
    ]
}

/// Returns the sample event feed, stamped with the current time.
pub fn sample_events() -> Vec<Event> {
    let now = Utc::now().timestamp();
    vec![
        Event::new("e1", "srv-1", now)
            .with_type("alert")
            .with_severity(0.8)
            .with_labels(vec!["exfil".to_string()]),
        Event::new("e2", "db-1", now)
            .with_type("anomaly")
            .with_severity(0.6)
            .with_labels(vec!["lateral".to_string()]),
        Event::new("e3", "srv-2", now)
            .with_type("incident")
            .with_severity(0.3),
    ]
}

/// Writes the sample asset and event documents to the given paths.
pub fn write_sample_files(assets_out: &Path, events_out: &Path) -> Result<()> {
    let assets = serde_json::json!({ "assets": sample_assets() });
    std::fs::write(assets_out, serde_json::to_string_pretty(&assets)?)
        .with_context(|| format!("writing sample assets to {}", assets_out.display()))?;

    let events = serde_json::json!({ "events": sample_events() });
    std::fs::write(events_out, serde_json::to_string_pretty(&events)?)
        .with_context(|| format!("writing sample events to {}", events_out.display()))?;

    Ok(())
}
