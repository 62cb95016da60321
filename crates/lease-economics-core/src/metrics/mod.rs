//! Discounting and return metrics over the lease cash flows.

pub mod discounting;
pub mod returns;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::deal::DealDefinition;
use crate::schedule::{AnnualLine, MonthlySchedule};
use crate::types::{CashFlow, Money, Rate};

pub use discounting::{
    irr, irr_outcome, irr_with_outlay, npv, npv_monthly, payback_period, payback_period_with_outlay,
};
pub use returns::{cash_on_cash, effective_rent_psf, yield_on_cost};

const IRR_GUESS: Decimal = dec!(0.10);

/// Headline figures for one lease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseMetrics {
    pub term_months: u32,
    pub total_contract_rent: Money,
    pub free_rent_value: Money,
    pub total_net_cash_flow: Money,
    /// Annual flows discounted at year end
    pub npv: Money,
    /// Monthly flows discounted at their payment dates
    pub npv_monthly: Money,
    /// Net cash flow per SF per year of term
    pub effective_rent_psf: Money,
    /// TI allowance, moving allowance and other credits
    pub upfront_concessions: Money,
    /// IRR of the concession outlay against the annual flows; absent without an outlay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub irr_on_concessions: Option<Rate>,
    pub irr_converged: bool,
    pub payback_years: Decimal,
    pub yield_on_cost: Rate,
    pub cash_on_cash: Rate,
}

impl LeaseMetrics {
    /// Metric names accepted by [`LeaseMetrics::value`].
    pub const NAMES: [&'static str; 9] = [
        "npv",
        "npv_monthly",
        "effective_rent_psf",
        "total_net_cash_flow",
        "free_rent_value",
        "irr_on_concessions",
        "payback_years",
        "yield_on_cost",
        "cash_on_cash",
    ];

    /// Look up a numeric metric by name.
    pub fn value(&self, name: &str) -> Option<Decimal> {
        match name {
            "npv" => Some(self.npv),
            "npv_monthly" => Some(self.npv_monthly),
            "effective_rent_psf" => Some(self.effective_rent_psf),
            "total_net_cash_flow" => Some(self.total_net_cash_flow),
            "free_rent_value" => Some(self.free_rent_value),
            "irr_on_concessions" => self.irr_on_concessions,
            "payback_years" => Some(self.payback_years),
            "yield_on_cost" => Some(self.yield_on_cost),
            "cash_on_cash" => Some(self.cash_on_cash),
            _ => None,
        }
    }
}

/// Compute all metrics from an assembled schedule and its annual roll-up.
pub fn compute_metrics(deal: &DealDefinition, monthly: &MonthlySchedule, annual: &[AnnualLine]) -> LeaseMetrics {
    let rate = deal.discount_rate;
    let term_months = monthly.months.len() as u32;
    let years = Decimal::from(term_months) / dec!(12);
    let total_net_cash_flow: Money = annual.iter().map(|y| y.net_cash_flow).sum();
    let outlay = deal.upfront_concessions();

    let npv_monthly_value = match monthly.months.first() {
        Some(first) => {
            let flows: Vec<CashFlow> = monthly
                .months
                .iter()
                .map(|m| CashFlow::new(m.payment_date, m.net_cash_flow))
                .collect();
            npv_monthly(&flows, rate, first.start)
        }
        None => Decimal::ZERO,
    };

    let (irr_on_concessions, irr_converged) = if outlay > Decimal::ZERO && !annual.is_empty() {
        let outcome = irr_with_outlay(outlay, annual, IRR_GUESS);
        (Some(outcome.rate), outcome.converged)
    } else {
        (None, false)
    };

    let average_annual = if years > Decimal::ZERO {
        total_net_cash_flow / years
    } else {
        Decimal::ZERO
    };
    let first_year = annual.first().map_or(Decimal::ZERO, |y| y.net_cash_flow);

    LeaseMetrics {
        term_months,
        total_contract_rent: monthly.summary.total_contract_rent,
        free_rent_value: monthly.summary.free_rent_value,
        total_net_cash_flow,
        npv: npv(annual, rate),
        npv_monthly: npv_monthly_value,
        effective_rent_psf: effective_rent_psf(total_net_cash_flow, deal.rentable_area, years),
        upfront_concessions: outlay,
        irr_on_concessions,
        irr_converged,
        payback_years: payback_period_with_outlay(outlay, annual),
        yield_on_cost: yield_on_cost(average_annual, outlay),
        cash_on_cash: cash_on_cash(first_year, outlay),
    }
}
