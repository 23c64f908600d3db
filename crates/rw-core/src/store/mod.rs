//! Asset and event stores.
//!
//! The stores load JSON documents from disk into validated in-memory records,
//! applying the documented defaults for absent fields and permissive numeric
//! coercion for malformed ones. A degraded field never fails a load; only an
//! unreadable file or a structurally invalid document does.

use crate::models::{Asset, Event};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while loading a store document.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse input document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Coerces a JSON value to a number, falling back to `default`.
///
/// Numbers pass through, numeric strings are parsed, everything else (null,
/// booleans, arrays, objects, non-numeric strings) takes the fallback.
pub fn to_num(value: &Value, default: f64) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(default),
        Value::String(s) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

/// Coerces an optional field: absent takes `missing`, present-but-non-numeric
/// degrades to 0.0.
fn coerce_num(value: Option<&Value>, missing: f64) -> f64 {
    match value {
        Some(value) => to_num(value, 0.0),
        None => missing,
    }
}

fn generated_id() -> String {
    Uuid::new_v4().to_string()
}

/// On-disk asset record with every field optional.
#[derive(Debug, Default, Deserialize)]
struct AssetRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    asset_type: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    criticality: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AssetDocument {
    #[serde(default)]
    assets: Vec<AssetRecord>,
}

impl From<AssetRecord> for Asset {
    fn from(record: AssetRecord) -> Self {
        let id = record.id.unwrap_or_else(generated_id);
        Self {
            name: record.name.unwrap_or_else(|| id.clone()),
            id,
            asset_type: record.asset_type.unwrap_or_default(),
            tags: record.tags,
            criticality: coerce_num(record.criticality.as_ref(), 0.5),
        }
    }
}

/// Id-keyed collection of assets.
#[derive(Debug, Default)]
pub struct AssetStore {
    assets: HashMap<String, Asset>,
}

impl AssetStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads assets from a `{"assets": [...]}` JSON document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        let document: AssetDocument = serde_json::from_str(&contents)?;
        let mut store = Self::new();
        for record in document.assets {
            store.insert(record.into());
        }
        Ok(store)
    }

    /// Inserts an asset, replacing any previous asset with the same id.
    pub fn insert(&mut self, asset: Asset) {
        self.assets.insert(asset.id.clone(), asset);
    }

    /// Looks up an asset by id.
    pub fn get(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    /// Iterates over all assets (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    /// Number of assets in the store.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the store holds no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// On-disk event record with every field optional.
#[derive(Debug, Default, Deserialize)]
struct EventRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    ts: Option<i64>,
    #[serde(default)]
    asset: Option<String>,
    #[serde(default, rename = "type")]
    event_type: Option<String>,
    #[serde(default)]
    severity: Option<Value>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct EventDocument {
    #[serde(default)]
    events: Vec<EventRecord>,
}

impl From<EventRecord> for Event {
    fn from(record: EventRecord) -> Self {
        Self {
            id: record.id.unwrap_or_else(generated_id),
            ts: record.ts.unwrap_or_else(|| Utc::now().timestamp()),
            asset_id: record.asset.unwrap_or_default(),
            event_type: record.event_type.unwrap_or_default(),
            severity: coerce_num(record.severity.as_ref(), 0.5),
            labels: record.labels,
            data: record
                .data
                .unwrap_or_else(|| Value::Object(Default::default())),
        }
    }
}

/// Criteria for filtering events. All present criteria must hold.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Event type must equal this.
    pub event_type: Option<String>,
    /// Event labels must contain this.
    pub label: Option<String>,
    /// Event must reference this asset.
    pub asset_id: Option<String>,
}

impl EventFilter {
    /// Checks whether an event satisfies every present criterion.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(event_type) = &self.event_type {
            if &event.event_type != event_type {
                return false;
            }
        }
        if let Some(label) = &self.label {
            if !event.has_label(label) {
                return false;
            }
        }
        if let Some(asset_id) = &self.asset_id {
            if &event.asset_id != asset_id {
                return false;
            }
        }
        true
    }
}

/// Ordered collection of events. Iteration order is load order.
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads events from a `{"events": [...]}` JSON document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path)?;
        let document: EventDocument = serde_json::from_str(&contents)?;
        Ok(Self {
            events: document.events.into_iter().map(Event::from).collect(),
        })
    }

    /// Appends an event.
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// All events, in load order.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    /// Events satisfying the given filter, in load order.
    pub fn filter<'a>(&'a self, filter: &EventFilter) -> Vec<&'a Event> {
        self.events.iter().filter(|e| filter.matches(e)).collect()
    }

    /// Number of events in the store.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
