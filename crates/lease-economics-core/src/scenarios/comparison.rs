use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scenario::ScenarioRun;
use crate::metrics::LeaseMetrics;
use crate::types::Money;

/// One metric side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub metric: String,
    pub base: Decimal,
    pub variant: Decimal,
    pub delta: Decimal,
}

/// One lease year's net cash flow side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearDelta {
    pub year: u32,
    pub base: Money,
    pub variant: Money,
    pub delta: Money,
}

/// Base vs. variant summary for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub base_name: String,
    pub variant_name: String,
    pub metrics: Vec<MetricDelta>,
    pub years: Vec<YearDelta>,
}

/// Diff two scenario runs. Metrics missing on either side (IRR without an
/// outlay) are skipped; years present on only one side compare against zero.
pub fn compare_scenarios(base: &ScenarioRun, variant: &ScenarioRun) -> ScenarioComparison {
    let metrics = compare_metrics(&base.analysis.metrics, &variant.analysis.metrics);

    let base_years = &base.analysis.annual;
    let variant_years = &variant.analysis.annual;
    let count = base_years.len().max(variant_years.len());
    let years = (0..count)
        .map(|i| {
            let b = base_years.get(i).map_or(Decimal::ZERO, |y| y.net_cash_flow);
            let v = variant_years.get(i).map_or(Decimal::ZERO, |y| y.net_cash_flow);
            YearDelta {
                year: i as u32 + 1,
                base: b,
                variant: v,
                delta: v - b,
            }
        })
        .collect();

    ScenarioComparison {
        base_name: base.name.clone(),
        variant_name: variant.name.clone(),
        metrics,
        years,
    }
}

fn compare_metrics(base: &LeaseMetrics, variant: &LeaseMetrics) -> Vec<MetricDelta> {
    LeaseMetrics::NAMES
        .iter()
        .filter_map(|name| {
            let b = base.value(name)?;
            let v = variant.value(name)?;
            Some(MetricDelta {
                metric: name.to_string(),
                base: b,
                variant: v,
                delta: v - b,
            })
        })
        .collect()
}
