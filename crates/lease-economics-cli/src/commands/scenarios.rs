use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use lease_economics_core::deal::DealDefinition;
use lease_economics_core::scenarios::{
    analyze_scenarios, compare_scenarios, run_scenario as run_variant, run_sensitivity as sweep, SensitivityInput,
};
use lease_economics_core::schedule::ScheduleOptions;
use lease_economics_core::types::{Scenario, SensitivityVariable};

use crate::input;

/// Arguments for scenario analysis
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to the base deal file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// File with a list of weighted scenarios ({name, probability, overrides})
    #[arg(long, required_unless_present = "compare")]
    pub scenarios: Option<String>,

    /// File with a single override document to compare against the base
    #[arg(long, conflicts_with = "scenarios")]
    pub compare: Option<String>,

    /// Label for the compared variant
    #[arg(long, default_value = "Variant")]
    pub name: String,
}

/// Arguments for sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to the base deal file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// First deal field to sweep in format path:min:max:step
    /// (e.g. "discount_rate:0.05:0.10:0.01")
    #[arg(long)]
    pub var1: String,

    /// Second deal field to sweep
    /// (e.g. "concessions.ti_allowance_psf:20:60:10")
    #[arg(long)]
    pub var2: String,

    /// Metric reported in each cell
    #[arg(long, default_value = "npv")]
    pub metric: String,
}

fn parse_sens_var(raw: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be path:min:max:step, got '{}'",
            raw
        )
        .into());
    }
    Ok(SensitivityVariable {
        name: parts[0].to_string(),
        min: parts[1].parse::<Decimal>()?,
        max: parts[2].parse::<Decimal>()?,
        step: parts[3].parse::<Decimal>()?,
    })
}

pub fn run_scenario(args: ScenarioArgs, options: &ScheduleOptions) -> Result<Value, Box<dyn std::error::Error>> {
    let base: DealDefinition = input::read_input(args.input.as_deref(), "scenario analysis")?;

    if let Some(ref path) = args.compare {
        let overrides = input::file::read_value(path)?;
        let base_run = run_variant(&base, "Base", &json!({}), options)?;
        let variant_run = run_variant(&base, &args.name, &overrides, options)?;
        let comparison = compare_scenarios(&base_run, &variant_run);
        let mut warnings = base_run.warnings;
        warnings.extend(variant_run.warnings);
        return Ok(json!({
            "result": comparison,
            "warnings": warnings,
        }));
    }

    let path = args.scenarios.ok_or("--scenarios <file> or --compare <file> required")?;
    let scenarios: Vec<Scenario> = input::file::read_document(&path)?;
    let output = analyze_scenarios(&base, &scenarios, options)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_sensitivity(args: SensitivityArgs, options: &ScheduleOptions) -> Result<Value, Box<dyn std::error::Error>> {
    let base: DealDefinition = input::read_input(args.input.as_deref(), "sensitivity analysis")?;
    let sensitivity = SensitivityInput {
        variable_1: parse_sens_var(&args.var1)?,
        variable_2: parse_sens_var(&args.var2)?,
        output_metric: args.metric,
    };
    let output = sweep(&base, &sensitivity, options)?;
    Ok(serde_json::to_value(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_sensitivity_variable() {
        let var = parse_sens_var("concessions.ti_allowance_psf:20:60:10").unwrap();
        assert_eq!(var.name, "concessions.ti_allowance_psf");
        assert_eq!(var.min, dec!(20));
        assert_eq!(var.max, dec!(60));
        assert_eq!(var.step, dec!(10));
    }

    #[test]
    fn test_parse_sensitivity_variable_rejects_bad_shape() {
        assert!(parse_sens_var("discount_rate:0.05:0.10").is_err());
        assert!(parse_sens_var("discount_rate:low:0.10:0.01").is_err());
    }
}
