//! Rule policy for Risk Warden.
//!
//! A policy is an ordered list of rules. Each rule has a set of match
//! conditions (all must hold) and a scoring formula. Conditions and formula
//! terms are explicit optional fields: an absent condition imposes no
//! constraint, an absent formula term contributes nothing.

use crate::models::{Asset, Event};
use crate::store::to_num;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Errors that can occur while loading a policy document.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Match conditions for a rule. All present conditions must hold (conjunction);
/// an empty set of conditions matches every asset/event pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchConditions {
    /// Event type must be one of these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<Vec<String>>,
    /// Asset type must be one of these.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<Vec<String>>,
    /// Asset must carry at least one of these tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_tags_any: Option<Vec<String>>,
    /// Event must carry at least one of these labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_labels_any: Option<Vec<String>>,
    /// Event severity must be at least this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_severity_gte: Option<f64>,
}

/// Scoring formula for a rule. Absent terms default to zero / empty, so a rule
/// with no formula scores zero and never shows up in the applied list.
///
/// Bonus maps are ordered so that summation order is stable across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreFormula {
    /// Flat base score.
    #[serde(default)]
    pub base: f64,
    /// Multiplier applied to the event severity.
    #[serde(default)]
    pub mul_severity: f64,
    /// Multiplier applied to the asset criticality.
    #[serde(default)]
    pub mul_criticality: f64,
    /// Bonus per event label present.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub if_label_bonus: BTreeMap<String, f64>,
    /// Bonus per asset tag present.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub if_tag_bonus: BTreeMap<String, f64>,
}

/// A single policy rule: match conditions plus a weighted scoring formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique identifier for this rule.
    pub id: String,
    /// Human-readable name, shown in the applied-rules listing.
    pub name: String,
    /// Weight multiplied into the computed score.
    pub weight: f64,
    /// Match conditions.
    #[serde(default)]
    pub when: MatchConditions,
    /// Scoring formula.
    #[serde(default)]
    pub calc: ScoreFormula,
}

impl Rule {
    /// Creates a rule with the given id, named after it, weight 1.0 and no
    /// conditions or formula.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            weight: 1.0,
            when: MatchConditions::default(),
            calc: ScoreFormula::default(),
        }
    }

    /// Sets the rule name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the rule weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Sets the match conditions.
    pub fn with_conditions(mut self, when: MatchConditions) -> Self {
        self.when = when;
        self
    }

    /// Sets the scoring formula.
    pub fn with_formula(mut self, calc: ScoreFormula) -> Self {
        self.calc = calc;
        self
    }

    /// Checks whether this rule matches the given asset/event pair.
    pub fn matches(&self, asset: &Asset, event: &Event) -> bool {
        let when = &self.when;
        if let Some(types) = &when.event_type {
            if !types.contains(&event.event_type) {
                return false;
            }
        }
        if let Some(types) = &when.asset_type {
            if !types.contains(&asset.asset_type) {
                return false;
            }
        }
        if let Some(tags) = &when.asset_tags_any {
            if !asset.has_any_tag(tags) {
                return false;
            }
        }
        if let Some(labels) = &when.event_labels_any {
            if !event.has_any_label(labels) {
                return false;
            }
        }
        if let Some(threshold) = when.event_severity_gte {
            if event.severity < threshold {
                return false;
            }
        }
        true
    }

    /// Computes this rule's score contribution for the given asset/event pair.
    ///
    /// `(base + severity * mul_severity + criticality * mul_criticality +
    /// label bonuses + tag bonuses) * weight`, floored at zero. Negative
    /// totals collapse to 0.0 rather than subtracting from other rules.
    pub fn score(&self, asset: &Asset, event: &Event) -> f64 {
        let calc = &self.calc;
        let mut bonus = 0.0;
        for (label, value) in &calc.if_label_bonus {
            if event.has_label(label) {
                bonus += value;
            }
        }
        for (tag, value) in &calc.if_tag_bonus {
            if asset.has_tag(tag) {
                bonus += value;
            }
        }
        let raw = calc.base
            + event.severity * calc.mul_severity
            + asset.criticality * calc.mul_criticality
            + bonus;
        (raw * self.weight).max(0.0)
    }
}

/// An ordered collection of rules with identity metadata.
///
/// Rule order determines the order of the applied listing in score results;
/// the total score is a plain sum and does not depend on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique identifier for this policy.
    pub id: String,
    /// Human-readable policy name.
    pub name: String,
    /// Policy document version.
    pub version: String,
    /// Rules, evaluated in order.
    pub rules: Vec<Rule>,
}

impl Policy {
    /// Loads a policy from a JSON document on disk.
    ///
    /// Missing rule ids are generated, missing names fall back to the id,
    /// and missing weights default to 1.0.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = std::fs::read_to_string(path)?;
        let document: PolicyDocument = serde_json::from_str(&contents)?;
        Ok(document.into())
    }

    /// Loads a policy from disk, substituting the built-in default policy if
    /// the file is missing or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(policy) => policy,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "falling back to built-in default policy"
                );
                Self::default_policy()
            }
        }
    }

    /// Returns the built-in default policy.
    ///
    /// Three rules: severity/criticality scoring for alert-class events, a
    /// label bonus for attack-technique labels, and a tag bonus for
    /// sensitive asset tags.
    pub fn default_policy() -> Self {
        Self {
            id: "default-policy".to_string(),
            name: "Default Risk Policy".to_string(),
            version: "1.0".to_string(),
            rules: vec![
                Rule::new("sev-asset")
                    .with_name("Severity and criticality")
                    .with_conditions(MatchConditions {
                        event_type: Some(vec![
                            "alert".to_string(),
                            "anomaly".to_string(),
                            "incident".to_string(),
                        ]),
                        ..MatchConditions::default()
                    })
                    .with_formula(ScoreFormula {
                        mul_severity: 60.0,
                        mul_criticality: 50.0,
                        ..ScoreFormula::default()
                    }),
                Rule::new("label-bonus")
                    .with_name("Label bonus")
                    .with_conditions(MatchConditions {
                        event_labels_any: Some(vec![
                            "privilege_escalation".to_string(),
                            "exfil".to_string(),
                            "lateral".to_string(),
                        ]),
                        ..MatchConditions::default()
                    })
                    .with_formula(ScoreFormula {
                        if_label_bonus: BTreeMap::from([
                            ("privilege_escalation".to_string(), 30.0),
                            ("exfil".to_string(), 40.0),
                            ("lateral".to_string(), 20.0),
                        ]),
                        ..ScoreFormula::default()
                    }),
                Rule::new("tag-bonus")
                    .with_name("Asset tag bonus")
                    .with_conditions(MatchConditions {
                        asset_tags_any: Some(vec![
                            "prod".to_string(),
                            "pci".to_string(),
                            "pii".to_string(),
                        ]),
                        ..MatchConditions::default()
                    })
                    .with_formula(ScoreFormula {
                        base: 10.0,
                        if_tag_bonus: BTreeMap::from([
                            ("prod".to_string(), 20.0),
                            ("pci".to_string(), 25.0),
                            ("pii".to_string(), 25.0),
                        ]),
                        ..ScoreFormula::default()
                    }),
            ],
        }
    }
}

/// On-disk policy document with optional identity fields.
#[derive(Debug, Deserialize)]
struct PolicyDocument {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    rules: Vec<RuleDocument>,
}

/// On-disk rule record with optional fields and permissive weight.
#[derive(Debug, Deserialize)]
struct RuleDocument {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    weight: Option<serde_json::Value>,
    #[serde(default)]
    when: MatchConditions,
    #[serde(default)]
    calc: ScoreFormula,
}

impl From<PolicyDocument> for Policy {
    fn from(document: PolicyDocument) -> Self {
        let id = document
            .id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self {
            name: document.name.unwrap_or_else(|| id.clone()),
            id,
            version: document.version.unwrap_or_else(|| "1.0".to_string()),
            rules: document.rules.into_iter().map(Rule::from).collect(),
        }
    }
}

impl From<RuleDocument> for Rule {
    fn from(document: RuleDocument) -> Self {
        let id = document
            .id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self {
            name: document.name.unwrap_or_else(|| id.clone()),
            id,
            weight: match document.weight {
                Some(value) => to_num(&value, 0.0),
                None => 1.0,
            },
            when: document.when,
            calc: document.calc,
        }
    }
}
