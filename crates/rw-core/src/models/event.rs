//! Event data model.
//!
//! Events are the security-relevant observations being scored: alerts,
//! anomalies, incidents. Each event references the asset it was observed on;
//! the reference may dangle, in which case the engine skips the event.

use serde::{Deserialize, Serialize};

/// A security-relevant event to be scored against an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event.
    pub id: String,
    /// Observation time as unix seconds.
    pub ts: i64,
    /// Id of the asset this event was observed on. May reference an asset
    /// that is not loaded.
    #[serde(rename = "asset")]
    pub asset_id: String,
    /// Free-form event type (e.g. "alert", "anomaly", "incident").
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Severity, nominally in [0, 1]. Caller-supplied and not clamped.
    pub severity: f64,
    /// Labels attached by the upstream detector. Set semantics, like tags.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Opaque detector payload, carried through untouched.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Event {
    /// Creates a new event for the given asset with a mid-range severity.
    pub fn new(id: impl Into<String>, asset_id: impl Into<String>, ts: i64) -> Self {
        Self {
            id: id.into(),
            ts,
            asset_id: asset_id.into(),
            event_type: String::new(),
            severity: 0.5,
            labels: Vec::new(),
            data: serde_json::Value::Null,
        }
    }

    /// Sets the event type.
    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    /// Sets the severity.
    pub fn with_severity(mut self, severity: f64) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the labels.
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Checks whether the event carries the given label.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Checks whether the event carries at least one of the given labels.
    pub fn has_any_label(&self, labels: &[String]) -> bool {
        labels.iter().any(|l| self.has_label(l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_new_defaults() {
        let event = Event::new("e1", "srv-1", 1_700_000_000);
        assert_eq!(event.id, "e1");
        assert_eq!(event.asset_id, "srv-1");
        assert_eq!(event.ts, 1_700_000_000);
        assert_eq!(event.event_type, "");
        assert_eq!(event.severity, 0.5);
        assert!(event.labels.is_empty());
        assert!(event.data.is_null());
    }

    #[test]
    fn test_event_labels() {
        let event = Event::new("e1", "srv-1", 0)
            .with_labels(vec!["exfil".to_string(), "lateral".to_string()]);

        assert!(event.has_label("exfil"));
        assert!(!event.has_label("phishing"));
        assert!(event.has_any_label(&["phishing".to_string(), "lateral".to_string()]));
        assert!(!event.has_any_label(&["phishing".to_string()]));
    }

    #[test]
    fn test_event_serialization_wire_keys() {
        let event = Event::new("e1", "srv-1", 42).with_type("alert");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["asset"], "srv-1");
        assert_eq!(json["type"], "alert");
        assert!(json.get("asset_id").is_none());

        let deserialized: Event = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized.asset_id, "srv-1");
        assert_eq!(deserialized.event_type, "alert");
    }
}
