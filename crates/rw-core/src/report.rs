//! Report shaping.
//!
//! Packages engine output for presentation: per-asset summary rows with a
//! fixed sort contract (descending max, then descending avg, then ascending
//! asset id) and the exported report document.

use crate::engine::{aggregate, AssetAggregate, ScoreResult};
use crate::store::AssetStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One asset's row in the report summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Asset id.
    pub asset: String,
    /// Asset name.
    pub name: String,
    /// Asset type.
    #[serde(rename = "type")]
    pub asset_type: String,
    /// Mean event score.
    pub avg: f64,
    /// Maximum event score.
    pub max: f64,
    /// 95th percentile event score.
    pub p95: f64,
    /// 99th percentile event score.
    pub p99: f64,
    /// Number of scored events.
    pub count: usize,
}

/// The exported risk report: ranked summary plus full per-event details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Per-asset summary, sorted per the presentation contract.
    pub summary: Vec<SummaryRow>,
    /// Per-event score results, in evaluation order.
    pub details: Vec<ScoreResult>,
}

impl RiskReport {
    /// Builds a report from an evaluation result list.
    pub fn build(assets: &AssetStore, details: Vec<ScoreResult>) -> Self {
        let aggregates = aggregate(&details);
        Self {
            generated_at: Utc::now(),
            summary: summarize(assets, &aggregates),
            details,
        }
    }
}

/// Shapes aggregates into summary rows sorted by descending max score, then
/// descending average, then ascending asset id.
///
/// Rows for assets that cannot be looked up fall back to the id as name with
/// an empty type.
pub fn summarize(
    assets: &AssetStore,
    aggregates: &BTreeMap<String, AssetAggregate>,
) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = aggregates
        .values()
        .map(|agg| {
            let (name, asset_type) = match assets.get(&agg.asset_id) {
                Some(asset) => (asset.name.clone(), asset.asset_type.clone()),
                None => (agg.asset_id.clone(), String::new()),
            };
            SummaryRow {
                asset: agg.asset_id.clone(),
                name,
                asset_type,
                avg: agg.avg,
                max: agg.max,
                p95: agg.p95,
                p99: agg.p99,
                count: agg.count,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.max
            .total_cmp(&a.max)
            .then_with(|| b.avg.total_cmp(&a.avg))
            .then_with(|| a.asset.cmp(&b.asset))
    });
    rows
}
