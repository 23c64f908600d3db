//! Asset data model.
//!
//! Assets represent the infrastructure components (servers, databases, cloud
//! resources, etc.) that events are scored against. An asset's tags and
//! criticality feed directly into rule matching and scoring.

use serde::{Deserialize, Serialize};

/// An infrastructure asset known to the scoring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier for this asset. Events reference it by this id.
    pub id: String,
    /// Human-readable name for the asset.
    pub name: String,
    /// Free-form asset type (e.g. "vm", "db").
    #[serde(rename = "type", default)]
    pub asset_type: String,
    /// Tags used for categorization and tag-based rule bonuses.
    /// Treated as a set: membership is what matters, duplicates carry no weight.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Business criticality, nominally in [0, 1]. Caller-supplied and not
    /// clamped; rules multiply against it as-is.
    pub criticality: f64,
}

impl Asset {
    /// Creates a new asset with the given id, named after it, with no tags
    /// and a mid-range criticality.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            asset_type: String::new(),
            tags: Vec::new(),
            criticality: 0.5,
        }
    }

    /// Sets the asset name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the asset type.
    pub fn with_type(mut self, asset_type: impl Into<String>) -> Self {
        self.asset_type = asset_type.into();
        self
    }

    /// Sets the asset tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets the asset criticality.
    pub fn with_criticality(mut self, criticality: f64) -> Self {
        self.criticality = criticality;
        self
    }

    /// Checks whether the asset carries the given tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Checks whether the asset carries at least one of the given tags.
    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.has_tag(t))
    }
}
