use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const MIN_RATE: Decimal = dec!(-0.99);
const MAX_RATE: Decimal = dec!(10.0);

/// Result of a Newton-Raphson IRR search.
///
/// The solver never fails: when it cannot converge it reports the last
/// iterate with `converged = false`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrOutcome {
    pub rate: Rate,
    pub converged: bool,
    pub iterations: u32,
}

/// Monthly-equivalent rate of an effective annual rate: (1+annual)^(1/12) - 1
pub fn monthly_rate(annual: Rate) -> Rate {
    if annual.is_zero() {
        return Decimal::ZERO;
    }
    let one_plus = Decimal::ONE + annual;
    if one_plus <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    one_plus.powd(Decimal::ONE / dec!(12)) - Decimal::ONE
}

/// Net Present Value of a series of cash flows; `cash_flows[0]` is undiscounted.
///
/// Rates at or below -100% have no meaningful discount factor and yield zero.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> Money {
    if rate <= dec!(-1) {
        return Decimal::ZERO;
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            // Beyond the representable range the remaining terms vanish
            match discount.checked_mul(one_plus_r) {
                Some(d) => discount = d,
                None => break,
            }
        }
        result += cf / discount;
    }

    result
}

/// Internal Rate of Return using Newton-Raphson; `cash_flows[t]` occurs at period `t`.
pub fn irr(cash_flows: &[Money], guess: Rate) -> IrrOutcome {
    let mut rate = guess.clamp(MIN_RATE, MAX_RATE);

    for i in 0..MAX_IRR_ITERATIONS {
        let (npv_val, dnpv) = match npv_and_derivative(cash_flows, rate) {
            Some(v) => v,
            None => {
                return IrrOutcome {
                    rate,
                    converged: false,
                    iterations: i,
                }
            }
        };

        if npv_val.abs() < CONVERGENCE_THRESHOLD {
            return IrrOutcome {
                rate,
                converged: true,
                iterations: i,
            };
        }

        if dnpv.abs() < CONVERGENCE_THRESHOLD {
            return IrrOutcome {
                rate,
                converged: false,
                iterations: i,
            };
        }

        let step = match npv_val.checked_div(dnpv) {
            Some(s) => s,
            None => {
                return IrrOutcome {
                    rate,
                    converged: false,
                    iterations: i,
                }
            }
        };

        // Guard against divergence
        rate = (rate - step).clamp(MIN_RATE, MAX_RATE);
    }

    IrrOutcome {
        rate,
        converged: false,
        iterations: MAX_IRR_ITERATIONS,
    }
}

/// NPV(r) = sum CF_t / (1+r)^t and its derivative d(NPV)/dr.
///
/// Uses checked arithmetic: `None` when a discount factor leaves the
/// representable range (rates close to -100% over long horizons).
fn npv_and_derivative(cash_flows: &[Money], rate: Decimal) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    let mut npv = Decimal::ZERO;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE; // (1+r)^0 = 1

    for (t, cf) in cash_flows.iter().enumerate() {
        npv = npv.checked_add(cf.checked_div(discount)?)?;
        if t > 0 {
            // d/dr of CF_t / (1+r)^t = -t * CF_t / (1+r)^(t+1)
            let term = Decimal::from(t as i64)
                .checked_mul(*cf)?
                .checked_div(discount.checked_mul(one_plus_r)?)?;
            dnpv = dnpv.checked_sub(term)?;
        }
        discount = discount.checked_mul(one_plus_r)?;
    }

    Some((npv, dnpv))
}

/// Level payment that retires `principal` over `periods` at `periodic_rate`:
/// P * r / (1 - (1+r)^-n). Once `(1+r)^n` leaves the representable range the
/// discount term is zero and the payment is the interest-only limit `P * r`.
pub fn level_payment(principal: Money, periodic_rate: Rate, periods: u32) -> Money {
    if periods == 0 {
        return Decimal::ZERO;
    }
    if periodic_rate.is_zero() {
        return principal / Decimal::from(periods);
    }

    // (1 + r)^n via iterative multiplication
    let mut compound = Decimal::ONE;
    for _ in 0..periods {
        match compound.checked_mul(Decimal::ONE + periodic_rate) {
            Some(c) => compound = c,
            None => return principal.saturating_mul(periodic_rate),
        }
    }
    if compound.is_zero() {
        return principal / Decimal::from(periods);
    }

    let denominator = Decimal::ONE - Decimal::ONE / compound;
    if denominator.is_zero() {
        return principal / Decimal::from(periods);
    }

    principal * periodic_rate / denominator
}
