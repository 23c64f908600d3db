//! Batch scoring engine.
//!
//! Evaluation pairs each event with its asset, applies every policy rule that
//! matches, and sums the weighted contributions. Aggregation recomputes
//! per-asset summary statistics from a full result list; there is no
//! incremental state between calls.

use crate::models::Event;
use crate::policy::Policy;
use crate::stats::percentile;
use crate::store::AssetStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One rule's contribution to an event score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedRule {
    /// Id of the rule that fired.
    pub rule_id: String,
    /// Rule name.
    pub name: String,
    /// The rule's (weighted, clamped) score contribution.
    pub score: f64,
}

/// Scoring outcome for a single resolved event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Id of the scored event.
    pub event_id: String,
    /// Id of the asset the event resolved to.
    pub asset_id: String,
    /// Total score: sum of all applied rule contributions.
    pub score: f64,
    /// Rules that contributed a non-zero score, in policy order.
    pub applied: Vec<AppliedRule>,
    /// Event timestamp, carried through unchanged.
    pub ts: i64,
}

/// Summary statistics over one asset's event scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetAggregate {
    /// Id of the asset these statistics describe.
    pub asset_id: String,
    /// Number of scored events.
    pub count: usize,
    /// Sum of scores.
    pub sum: f64,
    /// Arithmetic mean of scores.
    pub avg: f64,
    /// Maximum score.
    pub max: f64,
    /// 95th percentile (linear interpolation).
    pub p95: f64,
    /// 99th percentile (linear interpolation).
    pub p99: f64,
}

/// Evaluates every event against the policy, producing one result per event
/// whose asset resolves.
///
/// Events referencing an unknown asset are skipped silently: no result, no
/// error. Rules are applied in policy order; rules that match but score zero
/// are left out of the applied listing. Given identical inputs the output is
/// identical: nothing here depends on time or randomness.
pub fn evaluate(assets: &AssetStore, events: &[Event], policy: &Policy) -> Vec<ScoreResult> {
    let mut results = Vec::with_capacity(events.len());
    for event in events {
        let asset = match assets.get(&event.asset_id) {
            Some(asset) => asset,
            None => {
                debug!(
                    event_id = %event.id,
                    asset_id = %event.asset_id,
                    "skipping event with unknown asset"
                );
                continue;
            }
        };

        let mut total = 0.0;
        let mut applied = Vec::new();
        for rule in &policy.rules {
            if !rule.matches(asset, event) {
                continue;
            }
            let value = rule.score(asset, event);
            if value != 0.0 {
                applied.push(AppliedRule {
                    rule_id: rule.id.clone(),
                    name: rule.name.clone(),
                    score: value,
                });
                total += value;
            }
        }

        results.push(ScoreResult {
            event_id: event.id.clone(),
            asset_id: asset.id.clone(),
            score: total,
            applied,
            ts: event.ts,
        });
    }
    debug!(
        events = events.len(),
        scored = results.len(),
        rules = policy.rules.len(),
        "evaluation complete"
    );
    results
}

/// Computes per-asset summary statistics from an evaluation result list.
///
/// Scores are grouped by asset id preserving their order within each asset.
/// Assets without any scored event do not appear at all.
pub fn aggregate(results: &[ScoreResult]) -> BTreeMap<String, AssetAggregate> {
    let mut by_asset: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for result in results {
        by_asset
            .entry(result.asset_id.as_str())
            .or_default()
            .push(result.score);
    }

    by_asset
        .into_iter()
        .map(|(asset_id, scores)| {
            let count = scores.len();
            let sum: f64 = scores.iter().sum();
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let aggregate = AssetAggregate {
                asset_id: asset_id.to_string(),
                count,
                sum,
                avg: sum / count as f64,
                max,
                p95: percentile(&scores, 95.0),
                p99: percentile(&scores, 99.0),
            };
            (asset_id.to_string(), aggregate)
        })
        .collect()
}
