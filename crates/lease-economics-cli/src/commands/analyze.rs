use clap::Args;
use serde_json::{json, Value};

use lease_economics_core::analysis::analyze_lease;
use lease_economics_core::deal::DealDefinition;
use lease_economics_core::normalize::normalize;
use lease_economics_core::schedule::ScheduleOptions;

use crate::input;

/// Arguments for the full lease analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to deal file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Report only the metrics instead of the full analysis
    #[arg(long)]
    pub metrics_only: bool,
}

/// Arguments for deal normalization
#[derive(Args)]
pub struct NormalizeArgs {
    /// Path to deal file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_analyze(args: AnalyzeArgs, options: &ScheduleOptions) -> Result<Value, Box<dyn std::error::Error>> {
    let deal: DealDefinition = input::read_input(args.input.as_deref(), "lease analysis")?;
    let output = analyze_lease(&deal, options)?;
    if args.metrics_only {
        return Ok(json!({
            "result": output.result.metrics,
            "methodology": output.methodology,
            "warnings": output.warnings,
        }));
    }
    Ok(serde_json::to_value(output)?)
}

pub fn run_normalize(args: NormalizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deal: DealDefinition = input::read_input(args.input.as_deref(), "normalization")?;
    let (bundle, issues) = normalize(&deal);
    let warnings: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
    Ok(json!({
        "result": bundle,
        "issues": issues,
        "warnings": warnings,
    }))
}
