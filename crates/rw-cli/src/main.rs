//! Risk Warden CLI
//!
//! Command-line interface for the Risk Warden batch scoring tool: loads
//! assets, events, and a rule policy from JSON files, scores every event,
//! and renders or exports the results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

mod sample;
mod table;

use rw_core::engine::{aggregate, evaluate};
use rw_core::policy::Policy;
use rw_core::report::{summarize, RiskReport, SummaryRow};
use rw_core::store::{AssetStore, EventFilter, EventStore};
use rw_observability::{init_logging_with_config, LoggingConfig};

#[derive(Parser)]
#[command(name = "risk-warden")]
#[command(author = "Risk Warden Team")]
#[command(version)]
#[command(about = "Batch risk scoring for security events against known assets", long_about = None)]
struct Cli {
    /// Asset inventory file
    #[arg(long, value_name = "FILE", default_value = "assets.json")]
    assets: PathBuf,

    /// Event feed file
    #[arg(long, value_name = "FILE", default_value = "events.json")]
    events: PathBuf,

    /// Policy document file (falls back to the built-in policy if unreadable)
    #[arg(long, value_name = "FILE", default_value = "policy.json")]
    policy: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score all events and export the risk report
    Report {
        /// Output path for the report document
        #[arg(short, long, value_name = "FILE", default_value = "risk.report.json")]
        out: PathBuf,
    },

    /// Show the highest-risk assets
    Top,

    /// Filter loaded events by type, label, or asset
    Filter {
        /// Keep only events of this type
        #[arg(long = "type")]
        event_type: Option<String>,

        /// Keep only events carrying this label
        #[arg(long)]
        label: Option<String>,

        /// Keep only events referencing this asset
        #[arg(long)]
        asset: Option<String>,
    },

    /// Check that the loaded inputs are usable
    Validate,

    /// Write sample asset and event files
    Gen {
        /// Output path for the sample asset inventory
        #[arg(long, value_name = "FILE", default_value = "assets.sample.json")]
        assets_out: PathBuf,

        /// Output path for the sample event feed
        #[arg(long, value_name = "FILE", default_value = "events.sample.json")]
        events_out: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base = if cli.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::default()
    };
    init_logging_with_config(LoggingConfig {
        json_format: cli.format == OutputFormat::Json,
        ..base
    });

    match cli.command {
        Commands::Report { ref out } => cmd_report(&cli, out.clone()),
        Commands::Top => cmd_top(&cli),
        Commands::Filter {
            ref event_type,
            ref label,
            ref asset,
        } => cmd_filter(&cli, event_type.clone(), label.clone(), asset.clone()),
        Commands::Validate => cmd_validate(&cli),
        Commands::Gen {
            ref assets_out,
            ref events_out,
        } => cmd_gen(assets_out, events_out),
    }
}

/// Loads the three inputs. Asset/event documents must parse; the policy falls
/// back to the built-in default on any failure.
fn load_inputs(cli: &Cli) -> Result<(AssetStore, EventStore, Policy)> {
    let assets = AssetStore::load(&cli.assets)
        .with_context(|| format!("loading assets from {}", cli.assets.display()))?;
    let events = EventStore::load(&cli.events)
        .with_context(|| format!("loading events from {}", cli.events.display()))?;
    let policy = Policy::load_or_default(&cli.policy);
    info!(
        assets = assets.len(),
        events = events.len(),
        policy = %policy.id,
        "inputs loaded"
    );
    Ok((assets, events, policy))
}

fn cmd_report(cli: &Cli, out: PathBuf) -> Result<()> {
    let (assets, events, policy) = load_inputs(cli)?;

    let results = evaluate(&assets, events.all(), &policy);
    let scored = results.len();
    let report = RiskReport::build(&assets, results);

    std::fs::write(&out, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("writing report to {}", out.display()))?;

    eprintln!(
        "{} scored {} of {} events across {} assets",
        "report:".green().bold(),
        scored,
        events.len(),
        report.summary.len()
    );
    println!("{}", out.display());
    Ok(())
}

fn cmd_top(cli: &Cli) -> Result<()> {
    let (assets, events, policy) = load_inputs(cli)?;

    let results = evaluate(&assets, events.all(), &policy);
    let aggregates = aggregate(&results);
    let summary = summarize(&assets, &aggregates);

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => println!("{}", render_top_table(&summary)),
    }
    Ok(())
}

fn render_top_table(summary: &[SummaryRow]) -> String {
    let rows: Vec<Vec<String>> = summary
        .iter()
        .map(|row| {
            vec![
                row.asset.clone(),
                row.name.clone(),
                format!("{:.2}", row.avg),
                format!("{:.2}", row.max),
                row.count.to_string(),
            ]
        })
        .collect();
    table::render(&["asset", "name", "avg", "max", "count"], &rows)
}

fn cmd_filter(
    cli: &Cli,
    event_type: Option<String>,
    label: Option<String>,
    asset: Option<String>,
) -> Result<()> {
    let (_, events, _) = load_inputs(cli)?;

    let filter = EventFilter {
        event_type,
        label,
        asset_id: asset,
    };
    let matched = events.filter(&filter);

    let output = serde_json::json!({
        "count": matched.len(),
        "items": matched,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_validate(cli: &Cli) -> Result<()> {
    let (assets, events, policy) = load_inputs(cli)?;

    let mut errors = Vec::new();
    if assets.is_empty() {
        errors.push("assets:empty");
    }
    if events.is_empty() {
        errors.push("events:empty");
    }
    if policy.rules.is_empty() {
        errors.push("policy.rules:empty");
    }

    let output = serde_json::json!({
        "ok": errors.is_empty(),
        "errors": errors,
    });
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn cmd_gen(assets_out: &Path, events_out: &Path) -> Result<()> {
    sample::write_sample_files(assets_out, events_out)?;

    eprintln!("{} sample data written", "gen:".green().bold());
    println!("{}", assets_out.display());
    println!("{}", events_out.display());
    Ok(())
}
