//! Full lease analysis pipeline.
//!
//! normalize -> rent schedule -> charge assembly -> financing -> annual
//! roll-up -> metrics, wrapped in the standard computation envelope.

pub mod charges;

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::deal::DealDefinition;
use crate::error::LeaseEconError;
use crate::metrics::{compute_metrics, LeaseMetrics};
use crate::normalize::{normalize, NormalizationIssue, NormalizedBundle};
use crate::schedule::{
    build_monthly_schedule, roll_up_to_annual, AmortizationRow, AnnualLine, MonthlySchedule, RentConfig,
    ScheduleOptions,
};
use crate::types::{with_metadata, ComputationOutput};
use crate::LeaseEconResult;

/// Everything computed for one lease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseAnalysis {
    pub normalized: NormalizedBundle,
    pub issues: Vec<NormalizationIssue>,
    pub monthly: MonthlySchedule,
    pub annual: Vec<AnnualLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amortization: Vec<AmortizationRow>,
    pub metrics: LeaseMetrics,
}

/// Build the monthly schedule with every charge layered on. Also returns the
/// amortization rows of any financed pools.
pub fn assemble_schedule(
    deal: &DealDefinition,
    bundle: &NormalizedBundle,
    options: &ScheduleOptions,
) -> (MonthlySchedule, Vec<AmortizationRow>) {
    let rent = RentConfig::from_deal(deal, bundle);
    let mut schedule = build_monthly_schedule(bundle, &rent, deal.rentable_area, options);

    charges::apply_recurring_charges(deal, bundle, &mut schedule.months, options);
    charges::apply_one_time_costs(deal, &mut schedule.months, options);
    let amortization = charges::apply_financing(
        deal,
        &mut schedule.months,
        schedule.summary.free_rent_value,
        options,
    );

    (schedule, amortization)
}

/// Analyze a lease end to end.
///
/// Input problems never abort the analysis; they come back as warnings. The
/// only error is a deal whose dates cannot produce a single month of
/// schedule.
pub fn analyze_lease(
    deal: &DealDefinition,
    options: &ScheduleOptions,
) -> LeaseEconResult<ComputationOutput<LeaseAnalysis>> {
    let start = Instant::now();

    let (bundle, issues) = normalize(deal);
    tracing::debug!(
        term_months = bundle.dates.term_months,
        abatement_periods = bundle.abatement.len(),
        "deal normalized"
    );

    let (monthly, amortization) = assemble_schedule(deal, &bundle, options);
    if monthly.months.is_empty() {
        return Err(LeaseEconError::InsufficientData(
            "Commencement and expiration (or a lease term) are required to build a schedule".into(),
        ));
    }

    let annual = roll_up_to_annual(&monthly.months);
    let metrics = compute_metrics(deal, &monthly, &annual);
    tracing::debug!(years = annual.len(), npv = %metrics.npv, "lease analyzed");

    let mut warnings: Vec<String> = issues.iter().map(|i| i.message.clone()).collect();
    if metrics.irr_on_concessions.is_some() && !metrics.irr_converged {
        warnings.push("IRR on concessions did not converge; reporting the last iterate".into());
    }

    let analysis = LeaseAnalysis {
        normalized: bundle,
        issues,
        monthly,
        annual,
        amortization,
        metrics,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Lease Economics: monthly schedule, annual roll-up, discounted metrics",
        &serde_json::json!({
            "lease_type": deal.lease_type,
            "rentable_area": deal.rentable_area.to_string(),
            "discount_rate": deal.discount_rate.to_string(),
            "payment_timing": options.payment_timing,
            "rounding": options.rounding,
            "discounting": "annual flows at year end; monthly flows at payment date",
        }),
        warnings,
        elapsed,
        analysis,
    ))
}
