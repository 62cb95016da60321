//! Annual roll-up of the monthly schedule, and the older annual-only builder
//! kept for reconciliation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::escalated::EscalatedRate;
use super::monthly::{MonthlyLine, RentConfig};
use crate::calendar::add_months;
use crate::normalize::NormalizedBundle;
use crate::types::{Area, Money};

/// One lease year of cash flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualLine {
    /// 1-based lease year
    pub year: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub months: u32,
    pub base_rent: Money,
    pub abatement_credit: Money,
    pub operating: Money,
    pub parking: Money,
    pub other_recurring: Money,
    pub ti_shortfall: Money,
    pub transaction_costs: Money,
    pub amortized_costs: Money,
    pub subtotal: Money,
    pub net_cash_flow: Money,
}

impl AnnualLine {
    fn empty(year: u32, start: NaiveDate, end: NaiveDate) -> Self {
        AnnualLine {
            year,
            start,
            end,
            months: 0,
            base_rent: Decimal::ZERO,
            abatement_credit: Decimal::ZERO,
            operating: Decimal::ZERO,
            parking: Decimal::ZERO,
            other_recurring: Decimal::ZERO,
            ti_shortfall: Decimal::ZERO,
            transaction_costs: Decimal::ZERO,
            amortized_costs: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            net_cash_flow: Decimal::ZERO,
        }
    }

    fn recompute(&mut self) {
        self.subtotal = self.base_rent + self.operating + self.parking + self.other_recurring;
        self.net_cash_flow = self.subtotal
            + self.abatement_credit
            + self.ti_shortfall
            + self.transaction_costs
            + self.amortized_costs;
    }
}

/// Sum consecutive 12-month blocks from lease month 0. The final block may be
/// partial.
pub fn roll_up_to_annual(months: &[MonthlyLine]) -> Vec<AnnualLine> {
    months
        .chunks(12)
        .enumerate()
        .filter_map(|(i, block)| {
            let first = block.first()?;
            let last = block.last()?;
            let mut line = AnnualLine::empty(i as u32 + 1, first.start, last.end);
            line.months = block.len() as u32;
            for m in block {
                line.base_rent += m.base_rent;
                line.abatement_credit += m.abatement_credit;
                line.operating += m.operating;
                line.parking += m.parking;
                line.other_recurring += m.other_recurring;
                line.ti_shortfall += m.ti_shortfall;
                line.transaction_costs += m.transaction_costs;
                line.amortized_costs += m.amortized_costs;
            }
            line.recompute();
            Some(line)
        })
        .collect()
}

/// Annual-only base rent and abatement, computed directly from the bundle.
///
/// Each lease month is charged the full monthly rate in effect on its first
/// day, and a month is fully abated when its first day falls inside an
/// abatement period. No proration, no other charges. On leases made of whole
/// months with anniversary escalations this agrees with [`roll_up_to_annual`].
pub fn build_annual_legacy(bundle: &NormalizedBundle, rent: &RentConfig, area: Area) -> Vec<AnnualLine> {
    let (Some(commencement), Some(expiration)) =
        (bundle.dates.commencement, bundle.dates.expiration)
    else {
        return Vec::new();
    };
    if expiration < commencement {
        return Vec::new();
    }

    let rate = EscalatedRate::new(&rent.steps, &bundle.rent_escalation);
    let area = area.max(Decimal::ZERO);

    let mut years: Vec<AnnualLine> = Vec::new();
    let mut period = 0u32;
    while let Some(start) = add_months(commencement, period) {
        if start > expiration {
            break;
        }
        let year = period / 12 + 1;
        if years.last().map(|y| y.year) != Some(year) {
            let year_end = add_months(commencement, year * 12)
                .and_then(|d| d.pred_opt())
                .map_or(expiration, |d| d.min(expiration));
            years.push(AnnualLine::empty(year, start, year_end));
        }

        let monthly = rate.rate_on(start).saturating_mul(area) / dec!(12);
        let abated = bundle
            .abatement
            .iter()
            .any(|p| p.is_effective() && p.start <= start && start <= p.end);

        if let Some(line) = years.last_mut() {
            line.months += 1;
            line.base_rent += monthly;
            if abated {
                line.abatement_credit -= monthly;
            }
        }
        period += 1;
    }

    for line in &mut years {
        line.recompute();
    }
    years
}
