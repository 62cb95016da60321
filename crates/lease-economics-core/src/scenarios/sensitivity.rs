use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use super::merge::{deep_merge, override_at, value_at};
use super::scenario::run_scenario;
use crate::analysis::analyze_lease;
use crate::deal::DealDefinition;
use crate::error::LeaseEconError;
use crate::metrics::LeaseMetrics;
use crate::schedule::ScheduleOptions;
use crate::types::*;
use crate::LeaseEconResult;

/// Input for 2-way sensitivity analysis over deal fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    /// First deal field to sweep, as a dotted path (e.g. "discount_rate")
    pub variable_1: SensitivityVariable,
    /// Second deal field to sweep (e.g. "concessions.ti_allowance_psf")
    pub variable_2: SensitivityVariable,
    /// Metric reported in each cell (see `LeaseMetrics::NAMES`)
    pub output_metric: String,
}

/// Output of 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: String,
    /// Matrix[i][j] = output when variable_1 = variable_1_values[i], variable_2 = variable_2_values[j]
    pub matrix: Vec<Vec<Decimal>>,
    /// Metric for the unmodified deal
    pub base_case_value: Decimal,
    /// Cell closest to the deal's own values (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> LeaseEconResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(LeaseEconError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(LeaseEconError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        current += var.step;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Current numeric value of a dotted deal path, if it holds one.
fn current_value(deal_json: &serde_json::Value, path: &str) -> Option<Decimal> {
    match value_at(deal_json, path)? {
        serde_json::Value::String(s) => Decimal::from_str(s).ok(),
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// Sweep two deal fields over their ranges and report one metric per cell.
///
/// Each cell is an independent scenario run against `deal`. Cells that fail
/// to evaluate are reported as warnings and hold zero.
pub fn run_sensitivity(
    deal: &DealDefinition,
    input: &SensitivityInput,
    options: &ScheduleOptions,
) -> LeaseEconResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if !LeaseMetrics::NAMES.contains(&input.output_metric.as_str()) {
        return Err(LeaseEconError::InvalidInput {
            field: "output_metric".into(),
            reason: format!(
                "Unknown metric '{}'; expected one of {}",
                input.output_metric,
                LeaseMetrics::NAMES.join(", ")
            ),
        });
    }

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    let base_metrics = analyze_lease(deal, options)?.result.metrics;
    let base_case_value = base_metrics
        .value(&input.output_metric)
        .unwrap_or(Decimal::ZERO);

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let mut overrides = override_at(&input.variable_1.name, v1.to_string().into());
            deep_merge(
                &mut overrides,
                &override_at(&input.variable_2.name, v2.to_string().into()),
            );
            let cell = run_scenario(deal, "sensitivity", &overrides, options).and_then(|run| {
                run.analysis
                    .metrics
                    .value(&input.output_metric)
                    .ok_or_else(|| {
                        LeaseEconError::InsufficientData(format!(
                            "{} not available",
                            input.output_metric
                        ))
                    })
            });
            match cell {
                Ok(val) => row.push(val),
                Err(e) => {
                    warnings.push(format!("Evaluation failed at ({v1}, {v2}): {e}"));
                    row.push(Decimal::ZERO);
                }
            }
        }
        matrix.push(row);
    }

    // Anchor on the deal's own values, else the middle of each range
    let deal_json = serde_json::to_value(deal)?;
    let anchor = |var: &SensitivityVariable| {
        current_value(&deal_json, &var.name).unwrap_or((var.min + var.max) / dec!(2))
    };
    let base_row = closest_index(&v1_values, anchor(&input.variable_1));
    let base_col = closest_index(&v2_values, anchor(&input.variable_2));

    let output = SensitivityOutput {
        variable_1_name: input.variable_1.name.clone(),
        variable_2_name: input.variable_2.name.clone(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric.clone(),
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Lease Sensitivity Analysis",
        &serde_json::json!({
            "variable_1": input.variable_1.name,
            "variable_2": input.variable_2.name,
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}
