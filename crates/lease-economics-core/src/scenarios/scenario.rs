use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::merge::merge_scenario;
use crate::analysis::{analyze_lease, LeaseAnalysis};
use crate::deal::DealDefinition;
use crate::error::LeaseEconError;
use crate::schedule::ScheduleOptions;
use crate::types::*;
use crate::LeaseEconResult;

/// A deal variant and its full analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRun {
    pub name: String,
    pub deal: DealDefinition,
    pub analysis: LeaseAnalysis,
    pub warnings: Vec<String>,
}

/// Result for a single weighted scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub probability: Rate,
    pub npv: Money,
    pub effective_rent_psf: Money,
    pub deviation_from_base: Money,
    pub deviation_pct: Rate,
}

/// Output of probability-weighted scenario analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutput {
    pub base_npv: Money,
    pub results: Vec<ScenarioResult>,
    pub probability_weighted_npv: Money,
}

/// Merge `overrides` into `base` and run the merged deal through the full
/// pipeline. The base deal is left untouched.
pub fn run_scenario(
    base: &DealDefinition,
    name: &str,
    overrides: &serde_json::Value,
    options: &ScheduleOptions,
) -> LeaseEconResult<ScenarioRun> {
    let deal = merge_scenario(base, overrides)?;
    let output = analyze_lease(&deal, options)?;
    tracing::debug!(scenario = name, npv = %output.result.metrics.npv, "scenario run");
    Ok(ScenarioRun {
        name: name.to_string(),
        deal,
        analysis: output.result,
        warnings: output.warnings,
    })
}

/// Run every scenario against `base` and weight the resulting NPVs.
///
/// Probabilities must each lie in [0, 1] and sum to 1 within 0.001.
pub fn analyze_scenarios(
    base: &DealDefinition,
    scenarios: &[Scenario],
    options: &ScheduleOptions,
) -> LeaseEconResult<ComputationOutput<ScenarioOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if scenarios.is_empty() {
        return Err(LeaseEconError::InsufficientData(
            "At least one scenario required".into(),
        ));
    }

    for s in scenarios {
        if s.probability < Decimal::ZERO || s.probability > Decimal::ONE {
            return Err(LeaseEconError::InvalidInput {
                field: format!("scenario:{} probability", s.name),
                reason: "Probability must be between 0 and 1".into(),
            });
        }
    }

    let total_prob: Decimal = scenarios.iter().map(|s| s.probability).sum();
    let prob_tolerance = dec!(0.001);
    if (total_prob - Decimal::ONE).abs() > prob_tolerance {
        return Err(LeaseEconError::InvalidInput {
            field: "probabilities".into(),
            reason: format!("Probabilities must sum to 1.0 (got {total_prob})"),
        });
    }
    if total_prob != Decimal::ONE {
        warnings.push(format!(
            "Probabilities sum to {total_prob}; treated as approximately 1.0"
        ));
    }

    let base_npv = analyze_lease(base, options)?.result.metrics.npv;

    let mut results = Vec::with_capacity(scenarios.len());
    let mut probability_weighted_npv = Decimal::ZERO;

    for scenario in scenarios {
        let run = run_scenario(base, &scenario.name, &scenario.overrides, options)?;
        let metrics = &run.analysis.metrics;
        let deviation = metrics.npv - base_npv;
        let deviation_pct = if base_npv.is_zero() {
            if !deviation.is_zero() {
                warnings.push(format!(
                    "Base NPV is zero; cannot compute deviation_pct for scenario '{}'",
                    scenario.name
                ));
            }
            Decimal::ZERO
        } else {
            deviation / base_npv
        };

        probability_weighted_npv += scenario.probability * metrics.npv;

        results.push(ScenarioResult {
            name: scenario.name.clone(),
            probability: scenario.probability,
            npv: metrics.npv,
            effective_rent_psf: metrics.effective_rent_psf,
            deviation_from_base: deviation,
            deviation_pct,
        });
    }

    let output = ScenarioOutput {
        base_npv,
        results,
        probability_weighted_npv,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Probability-weighted lease scenarios",
        &serde_json::json!({
            "num_scenarios": scenarios.len(),
            "discount_rate": base.discount_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
