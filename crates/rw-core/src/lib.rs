//! # rw-core
//!
//! Core data models and scoring engine for Risk Warden.
//!
//! This crate provides the asset/event data models, the rule policy with its
//! match-and-score semantics, the batch scoring engine with per-asset
//! statistical aggregation, and the report shaping used by the CLI.

pub mod engine;
pub mod models;
pub mod policy;
pub mod report;
pub mod stats;
pub mod store;

pub use engine::{aggregate, evaluate, AppliedRule, AssetAggregate, ScoreResult};
pub use models::{Asset, Event};
pub use policy::{MatchConditions, Policy, PolicyError, Rule, ScoreFormula};
pub use report::{RiskReport, SummaryRow};
pub use store::{AssetStore, EventFilter, EventStore, StoreError};
