use rust_decimal::Decimal;

use crate::types::{Area, Money, Rate};

/// Effective rent in $/SF/yr: `total / area / years`. Zero when area or
/// years is not positive.
pub fn effective_rent_psf(total: Money, area: Area, years: Decimal) -> Money {
    if area <= Decimal::ZERO || years <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    total / area / years
}

/// Average annual net cash flow as a yield on the concession outlay.
pub fn yield_on_cost(average_annual_net: Money, outlay: Money) -> Rate {
    if outlay <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    average_annual_net / outlay
}

/// First-year net cash flow as a return on the concession outlay.
pub fn cash_on_cash(first_year_net: Money, outlay: Money) -> Rate {
    if outlay <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    first_year_net / outlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_effective_rent_psf() {
        // 174,000 over 5 years on 1,200 RSF
        assert_eq!(effective_rent_psf(dec!(174000), dec!(1200), dec!(5)), dec!(29));
        assert_eq!(effective_rent_psf(dec!(174000), Decimal::ZERO, dec!(5)), Decimal::ZERO);
        assert_eq!(effective_rent_psf(dec!(174000), dec!(1200), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_returns_on_outlay() {
        assert_eq!(yield_on_cost(dec!(36000), dec!(120000)), dec!(0.3));
        assert_eq!(cash_on_cash(dec!(30000), dec!(120000)), dec!(0.25));
        assert_eq!(yield_on_cost(dec!(36000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(cash_on_cash(dec!(36000), dec!(-5)), Decimal::ZERO);
    }
}
