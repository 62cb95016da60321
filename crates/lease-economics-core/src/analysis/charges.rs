//! Charge assembly: layers operating recoveries, parking, other recurring
//! charges, one-time costs and financed recoveries onto the monthly rent
//! schedule.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::calendar::add_months;
use crate::deal::{AmortizationMethod, DealDefinition, LeaseType};
use crate::normalize::{AbatementPeriod, NormalizedBundle, NormalizedEscalation};
use crate::schedule::monthly::abated_portion;
use crate::schedule::{
    build_amortization_schedule, negated, AmortizationRow, EscalatedRate, MonthlyLine, ScheduleOptions,
};
use crate::types::Money;

/// Last day of lease month `period` before clamping to expiration.
fn natural_end(commencement: NaiveDate, period: u32, fallback: NaiveDate) -> NaiveDate {
    add_months(commencement, period + 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(fallback)
}

/// Operating recoveries (NNN only), parking and other recurring charges.
pub(crate) fn apply_recurring_charges(
    deal: &DealDefinition,
    bundle: &NormalizedBundle,
    months: &mut [MonthlyLine],
    options: &ScheduleOptions,
) {
    let Some(commencement) = bundle.dates.commencement else {
        return;
    };
    let expiration = bundle.dates.expiration.unwrap_or(commencement);
    let area = deal.rentable_area.max(Decimal::ZERO);
    let anniversaries = |rate| NormalizedEscalation::fixed(commencement, expiration, rate);

    let operating = match deal.lease_type {
        LeaseType::TripleNet => Some(EscalatedRate::single(
            commencement,
            deal.operating.expense_psf,
            &bundle.operating_escalation,
        )),
        LeaseType::FullService => None,
    };
    let nnn_abatement: Vec<AbatementPeriod> = bundle
        .abatement
        .iter()
        .filter(|p| p.includes_nnn)
        .cloned()
        .collect();

    let parking_escalation = deal
        .parking
        .as_ref()
        .map(|p| (p, anniversaries(p.annual_escalation)));
    let parking = parking_escalation.as_ref().map(|(p, escalation)| {
        let annual = Decimal::from(p.spaces) * p.monthly_rate_per_space * dec!(12);
        EscalatedRate::single(commencement, annual, escalation)
    });

    let charge_escalations: Vec<_> = deal
        .other_charges
        .iter()
        .map(|c| (c.monthly_amount * dec!(12), anniversaries(c.annual_escalation)))
        .collect();
    let charges: Vec<_> = charge_escalations
        .iter()
        .map(|(annual, escalation)| EscalatedRate::single(commencement, *annual, escalation))
        .collect();

    for line in months.iter_mut() {
        let natural = natural_end(commencement, line.period, line.end);

        if let Some(rate) = &operating {
            line.operating = options
                .rounding
                .apply(rate.amount_between(line.start, line.end, natural, area));
            let credit = abated_portion(&nnn_abatement, line.start, line.end, line.operating);
            line.abatement_credit -= options.rounding.apply(credit);
        }
        if let Some(rate) = &parking {
            line.parking = options
                .rounding
                .apply(rate.amount_between(line.start, line.end, natural, Decimal::ONE));
        }
        let other: Money = charges
            .iter()
            .map(|rate| rate.amount_between(line.start, line.end, natural, Decimal::ONE))
            .sum();
        line.other_recurring = options.rounding.apply(other);

        line.recompute();
    }
}

/// TI shortfall and transaction costs, borne in the first month.
pub(crate) fn apply_one_time_costs(deal: &DealDefinition, months: &mut [MonthlyLine], options: &ScheduleOptions) {
    let Some(first) = months.first_mut() else {
        return;
    };
    first.ti_shortfall = negated(options.rounding.apply(deal.ti_shortfall()));
    first.transaction_costs = negated(options.rounding.apply(deal.transaction_cost_total()));
    first.recompute();
}

/// Amortize the financed cost pools over the schedule and add the payments
/// to `amortized_costs`. Returns the amortization rows.
pub(crate) fn apply_financing(
    deal: &DealDefinition,
    months: &mut [MonthlyLine],
    free_rent_value: Money,
    options: &ScheduleOptions,
) -> Vec<AmortizationRow> {
    let Some(financing) = &deal.financing else {
        return Vec::new();
    };

    let mut principal = Decimal::ZERO;
    if financing.amortize_ti_shortfall {
        principal += deal.ti_shortfall();
    }
    if financing.amortize_free_rent {
        principal += free_rent_value;
    }
    if financing.amortize_transaction_costs {
        principal += deal.transaction_cost_total();
    }

    let rate = match financing.method {
        AmortizationMethod::StraightLine => Decimal::ZERO,
        AmortizationMethod::Amortized => financing.annual_rate,
    };
    let rows = build_amortization_schedule(principal, rate, months.len() as u32);

    for (line, row) in months.iter_mut().zip(&rows) {
        line.amortized_costs = options.rounding.apply(row.payment);
        line.recompute();
    }

    tracing::debug!(%principal, months = rows.len(), "financed costs amortized");
    rows
}
