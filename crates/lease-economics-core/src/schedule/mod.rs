//! Schedule builders: monthly rent schedule, annual roll-up, amortization.

pub mod amortization;
pub mod annual;
pub mod escalated;
pub mod monthly;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub use amortization::{build_amortization_schedule, AmortizationRow, AmortizationSummary};
pub use annual::{build_annual_legacy, roll_up_to_annual, AnnualLine};
pub use escalated::{EscalatedRate, RateStep, ESCALATION_CEILING};
pub use monthly::{build_monthly_schedule, MonthlyLine, MonthlySchedule, RentConfig, ScheduleSummary};

/// When rent for a month is paid. Affects only the discounting date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    /// Paid on the first day of the period
    #[default]
    Advance,
    /// Paid on the last day of the period
    Arrears,
}

/// Numeric rounding applied to every monthly figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    #[default]
    None,
    /// Round half away from zero to two decimal places
    Cent,
}

impl RoundingPolicy {
    pub fn apply(&self, value: Decimal) -> Decimal {
        match self {
            RoundingPolicy::None => value,
            RoundingPolicy::Cent => value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        }
    }
}

/// `-value`, without producing a signed zero.
pub(crate) fn negated(value: Decimal) -> Decimal {
    if value.is_zero() {
        Decimal::ZERO
    } else {
        -value
    }
}

/// Schedule build options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOptions {
    #[serde(default)]
    pub payment_timing: PaymentTiming,
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cent_rounding_half_away_from_zero() {
        assert_eq!(RoundingPolicy::Cent.apply(dec!(2.345)), dec!(2.35));
        assert_eq!(RoundingPolicy::Cent.apply(dec!(-2.345)), dec!(-2.35));
        assert_eq!(RoundingPolicy::None.apply(dec!(2.345)), dec!(2.345));
    }

    #[test]
    fn test_options_default_from_empty_json() {
        let opts: ScheduleOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.payment_timing, PaymentTiming::Advance);
        assert_eq!(opts.rounding, RoundingPolicy::None);
    }
}
