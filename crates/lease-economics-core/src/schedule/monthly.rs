//! Monthly rent schedule builder.
//!
//! Walks the lease one billing month at a time from commencement to the
//! canonical expiration (which already carries the abatement extension when
//! the term includes it), computing contractual base rent under the resolved
//! escalation and the abatement credit against it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::escalated::{EscalatedRate, RateStep};
use super::{negated, PaymentTiming, ScheduleOptions};
use crate::calendar::{add_months, days_inclusive, overlap_days};
use crate::deal::DealDefinition;
use crate::normalize::{AbatementPeriod, NormalizedBundle};
use crate::types::{Area, Money};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Base rent steps ($/SF/yr) taken from the deal's rent schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RentConfig {
    pub steps: Vec<RateStep>,
}

impl RentConfig {
    /// The first row starts at commencement unless dated; later rows need a
    /// start date and are skipped without one.
    pub fn from_deal(deal: &DealDefinition, bundle: &NormalizedBundle) -> Self {
        let steps = deal
            .base_rent_schedule
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let start = match (i, row.start) {
                    (_, Some(start)) => start,
                    (0, None) => bundle.dates.commencement?,
                    _ => return None,
                };
                Some(RateStep {
                    start,
                    base: row.rent_psf,
                })
            })
            .collect();
        RentConfig { steps }
    }

    /// Flat rent from `start`.
    pub fn flat(start: NaiveDate, rent_psf: Money) -> Self {
        RentConfig {
            steps: vec![RateStep {
                start,
                base: rent_psf,
            }],
        }
    }
}

/// One billing month of the lease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyLine {
    /// 0-based month index from commencement
    pub period: u32,
    /// 1-based lease year
    pub lease_year: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub payment_date: NaiveDate,
    /// Contractual base rent before abatement
    pub base_rent: Money,
    /// Free-rent credit (never positive)
    pub abatement_credit: Money,
    pub net_rent_due: Money,
    pub operating: Money,
    pub parking: Money,
    pub other_recurring: Money,
    pub ti_shortfall: Money,
    pub transaction_costs: Money,
    pub amortized_costs: Money,
    /// Recurring charges only
    pub subtotal: Money,
    pub net_cash_flow: Money,
}

impl MonthlyLine {
    /// Recompute `subtotal` and `net_cash_flow` from the component fields.
    pub fn recompute(&mut self) {
        self.subtotal = self.base_rent + self.operating + self.parking + self.other_recurring;
        self.net_cash_flow = self.subtotal
            + self.abatement_credit
            + self.ti_shortfall
            + self.transaction_costs
            + self.amortized_costs;
    }
}

/// Schedule totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub months: u32,
    pub total_contract_rent: Money,
    pub total_net_rent: Money,
    /// Total free rent, as a positive amount
    pub free_rent_value: Money,
}

/// Monthly lines plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySchedule {
    pub months: Vec<MonthlyLine>,
    pub summary: ScheduleSummary,
}

impl MonthlySchedule {
    fn from_lines(months: Vec<MonthlyLine>) -> Self {
        let summary = ScheduleSummary {
            months: months.len() as u32,
            total_contract_rent: months.iter().map(|m| m.base_rent).sum(),
            total_net_rent: months.iter().map(|m| m.net_rent_due).sum(),
            free_rent_value: negated(months.iter().map(|m| m.abatement_credit).sum()),
        };
        MonthlySchedule { months, summary }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the monthly rent schedule.
///
/// Returns an empty schedule when commencement or expiration is unknown or
/// the dates are inverted. A lease shorter than one month yields exactly one
/// stub month spanning the lease's actual bounds.
pub fn build_monthly_schedule(
    bundle: &NormalizedBundle,
    rent: &RentConfig,
    area: Area,
    options: &ScheduleOptions,
) -> MonthlySchedule {
    let (Some(commencement), Some(expiration)) =
        (bundle.dates.commencement, bundle.dates.expiration)
    else {
        return MonthlySchedule::from_lines(Vec::new());
    };
    if expiration < commencement {
        return MonthlySchedule::from_lines(Vec::new());
    }

    let rate = EscalatedRate::new(&rent.steps, &bundle.rent_escalation);
    let area = area.max(Decimal::ZERO);
    let round = |v: Decimal| options.rounding.apply(v);

    let mut lines = Vec::new();
    let mut period = 0u32;
    while let Some(start) = add_months(commencement, period) {
        if start > expiration {
            break;
        }
        let Some(natural_end) = add_months(commencement, period + 1).and_then(|d| d.pred_opt())
        else {
            break;
        };
        let end = natural_end.min(expiration);

        let base_rent = round(rate.amount_between(start, end, natural_end, area));
        let abatement_credit = round(abatement_credit(&bundle.abatement, start, end, base_rent));

        let payment_date = match options.payment_timing {
            PaymentTiming::Advance => start,
            PaymentTiming::Arrears => end,
        };

        let mut line = MonthlyLine {
            period,
            lease_year: period / 12 + 1,
            start,
            end,
            payment_date,
            base_rent,
            abatement_credit,
            net_rent_due: base_rent + abatement_credit,
            operating: Decimal::ZERO,
            parking: Decimal::ZERO,
            other_recurring: Decimal::ZERO,
            ti_shortfall: Decimal::ZERO,
            transaction_costs: Decimal::ZERO,
            amortized_costs: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            net_cash_flow: Decimal::ZERO,
        };
        line.recompute();
        lines.push(line);
        period += 1;
    }

    tracing::debug!(months = lines.len(), "monthly rent schedule built");
    MonthlySchedule::from_lines(lines)
}

/// Portion of `amount` falling on days of `[start, end]` covered by effective
/// abatement periods. Never exceeds `amount`.
pub(crate) fn abated_portion(
    periods: &[AbatementPeriod],
    start: NaiveDate,
    end: NaiveDate,
    amount: Money,
) -> Money {
    let days = days_inclusive(start, end);
    if days <= 0 || amount <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let covered: i64 = periods
        .iter()
        .filter(|p| p.is_effective())
        .map(|p| overlap_days((start, end), (p.start, p.end)))
        .sum();
    if covered >= days {
        return amount;
    }
    amount * Decimal::from(covered) / Decimal::from(days)
}

fn abatement_credit(periods: &[AbatementPeriod], start: NaiveDate, end: NaiveDate, base_rent: Money) -> Money {
    negated(abated_portion(periods, start, end, base_rent))
}
