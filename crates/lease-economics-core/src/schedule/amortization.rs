//! Amortization of financed cost pools (TI shortfall, free rent, transaction
//! costs) recovered from the tenant over the lease term.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::{level_payment, monthly_rate};
use crate::types::{Money, Rate};

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based month
    pub month: u32,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub ending_balance: Money,
}

/// Schedule totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSummary {
    pub months: u32,
    pub total_payments: Money,
    pub total_interest: Money,
}

impl AmortizationSummary {
    pub fn from_rows(rows: &[AmortizationRow]) -> Self {
        AmortizationSummary {
            months: rows.len() as u32,
            total_payments: rows.iter().map(|r| r.payment).sum(),
            total_interest: rows.iter().map(|r| r.interest).sum(),
        }
    }
}

/// Amortize `principal` over `months` at an effective `annual_rate`.
///
/// A zero rate gives straight-line principal with no interest; a positive
/// rate gives a level payment at the monthly-equivalent rate. The final row
/// retires whatever balance remains, so the schedule always ends at zero.
/// Empty when `months` is zero or `principal` is not positive.
pub fn build_amortization_schedule(principal: Money, annual_rate: Rate, months: u32) -> Vec<AmortizationRow> {
    if months == 0 || principal <= Decimal::ZERO {
        return Vec::new();
    }

    let rate = if annual_rate > Decimal::ZERO {
        monthly_rate(annual_rate)
    } else {
        Decimal::ZERO
    };
    let payment = level_payment(principal, rate, months);

    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = principal;
    for month in 1..=months {
        let interest = balance * rate;
        let principal_paid = if month == months {
            balance
        } else {
            payment - interest
        };
        balance -= principal_paid;
        rows.push(AmortizationRow {
            month,
            payment: principal_paid + interest,
            interest,
            principal: principal_paid,
            ending_balance: balance,
        });
    }

    tracing::debug!(%principal, %annual_rate, months, "amortization schedule built");
    rows
}
