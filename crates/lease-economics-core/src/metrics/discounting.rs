use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::calendar::fractional_months;
use crate::schedule::AnnualLine;
use crate::time_value::{self, IrrOutcome};
use crate::types::{CashFlow, Money, Rate};

/// NPV of annual net cash flows, each discounted at the end of its lease
/// year: `sum(net_i / (1+rate)^(i+1))`. Zero when `rate <= -1`.
pub fn npv(lines: &[AnnualLine], rate: Rate) -> Money {
    time_value::npv(rate, &with_leading(Decimal::ZERO, lines))
}

/// NPV of dated cash flows at an effective annual rate.
///
/// Each flow is discounted by the monthly-equivalent rate over the whole and
/// fractional months elapsed since `epoch`, which is `(1+rate)^(months/12)`.
/// Flows on lease anniversaries therefore discount exactly like [`npv`].
pub fn npv_monthly(flows: &[CashFlow], annual_rate: Rate, epoch: NaiveDate) -> Money {
    if annual_rate <= dec!(-1) {
        return Decimal::ZERO;
    }
    let one_plus = Decimal::ONE + annual_rate;
    flows
        .iter()
        .map(|flow| {
            let years = fractional_months(epoch, flow.date) / dec!(12);
            match one_plus.checked_powd(years) {
                Some(factor) if !factor.is_zero() => flow.amount.checked_div(factor).unwrap_or(Decimal::ZERO),
                _ => Decimal::ZERO,
            }
        })
        .sum()
}

/// IRR of the annual net cash flows (year `i` at period `i+1`). Returns the
/// last Newton iterate when the search does not converge.
pub fn irr(lines: &[AnnualLine], guess: Rate) -> Rate {
    irr_outcome(lines, guess).rate
}

/// [`irr`] with convergence details.
pub fn irr_outcome(lines: &[AnnualLine], guess: Rate) -> IrrOutcome {
    time_value::irr(&with_leading(Decimal::ZERO, lines), guess)
}

/// IRR of an upfront `outlay` at period 0 recovered by the annual flows.
pub fn irr_with_outlay(outlay: Money, lines: &[AnnualLine], guess: Rate) -> IrrOutcome {
    time_value::irr(&with_leading(-outlay, lines), guess)
}

/// Years until cumulative net cash flow turns non-negative.
pub fn payback_period(lines: &[AnnualLine]) -> Decimal {
    payback_period_with_outlay(Decimal::ZERO, lines)
}

/// Years until cumulative net cash flow, starting from `-outlay`, turns
/// non-negative. Linear interpolation inside the crossing year; the number of
/// years when it never crosses.
pub fn payback_period_with_outlay(outlay: Money, lines: &[AnnualLine]) -> Decimal {
    let mut cumulative = -outlay;
    for (i, line) in lines.iter().enumerate() {
        let before = cumulative;
        cumulative += line.net_cash_flow;
        if cumulative >= Decimal::ZERO {
            let fraction = if before >= Decimal::ZERO {
                Decimal::ZERO
            } else {
                -before / line.net_cash_flow
            };
            return Decimal::from(i as u64) + fraction;
        }
    }
    Decimal::from(lines.len() as u64)
}

fn with_leading(first: Money, lines: &[AnnualLine]) -> Vec<Money> {
    std::iter::once(first)
        .chain(lines.iter().map(|l| l.net_cash_flow))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::add_months;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn lines(nets: &[Decimal]) -> Vec<AnnualLine> {
        let start = d(2024, 1, 1);
        nets.iter()
            .enumerate()
            .map(|(i, net)| AnnualLine {
                year: i as u32 + 1,
                start,
                end: start,
                months: 12,
                base_rent: *net,
                abatement_credit: Decimal::ZERO,
                operating: Decimal::ZERO,
                parking: Decimal::ZERO,
                other_recurring: Decimal::ZERO,
                ti_shortfall: Decimal::ZERO,
                transaction_costs: Decimal::ZERO,
                amortized_costs: Decimal::ZERO,
                subtotal: *net,
                net_cash_flow: *net,
            })
            .collect()
    }

    #[test]
    fn test_npv_discounts_first_year_one_period() {
        let l = lines(&[dec!(110), dec!(121)]);
        assert_eq!(npv(&l, dec!(0.10)), dec!(200));
        assert_eq!(npv(&l, Decimal::ZERO), dec!(231));
        assert_eq!(npv(&l, dec!(-1)), Decimal::ZERO);
    }

    #[test]
    fn test_npv_monthly_matches_annual_on_anniversaries() {
        let epoch = d(2024, 1, 1);
        let l = lines(&[dec!(36000), dec!(37080), dec!(38192.40)]);
        let flows: Vec<CashFlow> = l
            .iter()
            .enumerate()
            .map(|(i, line)| CashFlow::new(add_months(epoch, 12 * (i as u32 + 1)).unwrap(), line.net_cash_flow))
            .collect();
        for rate in [dec!(0), dec!(0.05), dec!(0.08), dec!(0.10), dec!(0.15)] {
            let diff = (npv(&l, rate) - npv_monthly(&flows, rate, epoch)).abs();
            assert!(diff < dec!(0.01), "rate {rate}: diff {diff}");
        }
    }

    #[test]
    fn test_npv_monthly_discounts_mid_month_fraction() {
        let epoch = d(2024, 1, 1);
        let flows = vec![CashFlow::new(d(2024, 1, 1), dec!(100)), CashFlow::new(d(2024, 1, 16), dec!(100))];
        let value = npv_monthly(&flows, dec!(0.12), epoch);
        assert!(value < dec!(200));
        assert!(value > dec!(199.5));
    }

    #[test]
    fn test_irr_with_outlay_recovers_known_rate() {
        // 1000 out, 1100 back one year later
        let outcome = irr_with_outlay(dec!(1000), &lines(&[dec!(1100)]), dec!(0.05));
        assert!(outcome.converged);
        assert!((outcome.rate - dec!(0.10)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_irr_without_sign_change_returns_iterate() {
        let l = lines(&[dec!(100), dec!(100)]);
        let outcome = irr_outcome(&l, dec!(0.1));
        assert!(!outcome.converged);
        assert_eq!(irr(&l, dec!(0.1)), outcome.rate);
    }

    #[test]
    fn test_payback_interpolates_inside_crossing_year() {
        let l = lines(&[dec!(400), dec!(400), dec!(400)]);
        assert_eq!(payback_period_with_outlay(dec!(1000), &l), dec!(2.5));
        assert_eq!(payback_period_with_outlay(dec!(5000), &l), dec!(3));
        assert_eq!(payback_period(&l), Decimal::ZERO);
    }

    #[test]
    fn test_payback_with_negative_first_year() {
        let l = lines(&[dec!(-100), dec!(200)]);
        // cumulative -100 after year 1, crosses halfway through year 2
        assert_eq!(payback_period(&l), dec!(1.5));
    }
}
