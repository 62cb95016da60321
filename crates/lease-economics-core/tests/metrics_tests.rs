use chrono::NaiveDate;
use lease_economics_core::analysis::analyze_lease;
use lease_economics_core::deal::{Concessions, DealDefinition, KeyDates, RentRow};
use lease_economics_core::metrics::{effective_rent_psf, npv, payback_period_with_outlay};
use lease_economics_core::schedule::ScheduleOptions;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn deal(discount_rate: Decimal) -> DealDefinition {
    DealDefinition {
        name: "Metrics".into(),
        rentable_area: dec!(10000),
        key_dates: KeyDates {
            commencement: NaiveDate::from_ymd_opt(2025, 1, 1),
            expiration: NaiveDate::from_ymd_opt(2034, 12, 31),
            ..Default::default()
        },
        base_rent_schedule: vec![RentRow {
            start: None,
            rent_psf: dec!(40),
            escalation_pct: Some(dec!(0.025)),
        }],
        concessions: Concessions {
            ti_allowance_psf: dec!(60),
            moving_allowance: dec!(25000),
            ..Default::default()
        },
        discount_rate,
        ..Default::default()
    }
}

// ===========================================================================
// NPV
// ===========================================================================

#[test]
fn test_npv_at_zero_equals_total_net() {
    let out = analyze_lease(&deal(Decimal::ZERO), &ScheduleOptions::default()).unwrap();
    let a = &out.result;
    let total: Decimal = a.annual.iter().map(|y| y.net_cash_flow).sum();
    assert_eq!(npv(&a.annual, Decimal::ZERO), total);
    assert_eq!(a.metrics.npv, total);
}

#[test]
fn test_npv_decreases_with_rate() {
    let out = analyze_lease(&deal(Decimal::ZERO), &ScheduleOptions::default()).unwrap();
    let annual = &out.result.annual;
    let mut previous = npv(annual, Decimal::ZERO);
    for rate in [dec!(0.02), dec!(0.05), dec!(0.08), dec!(0.12), dec!(0.20)] {
        let value = npv(annual, rate);
        assert!(value < previous, "npv at {rate} should fall below {previous}");
        previous = value;
    }
}

#[test]
fn test_monthly_npv_close_to_annual_npv_in_arrears() {
    // Monthly flows paid in arrears sit between the annual year-end
    // convention and full-year-early discounting
    let options = ScheduleOptions {
        payment_timing: lease_economics_core::schedule::PaymentTiming::Arrears,
        ..Default::default()
    };
    let out = analyze_lease(&deal(dec!(0.08)), &options).unwrap();
    let m = &out.result.metrics;
    assert!(m.npv_monthly > m.npv);
    assert!((m.npv_monthly - m.npv) / m.npv < dec!(0.05));
}

// ===========================================================================
// Returns on concessions
// ===========================================================================

#[test]
fn test_concession_returns() {
    let out = analyze_lease(&deal(dec!(0.08)), &ScheduleOptions::default()).unwrap();
    let m = &out.result.metrics;
    // 60 * 10,000 + 25,000
    assert_eq!(m.upfront_concessions, dec!(625000));
    // Year 1 rent 400,000; year 2 rent 410,000
    assert!((m.cash_on_cash - dec!(0.64)).abs() < dec!(0.000000001));
    let expected_payback = dec!(1) + dec!(225000) / dec!(410000);
    assert!((m.payback_years - expected_payback).abs() < dec!(0.000000001));
    assert_eq!(
        m.payback_years,
        payback_period_with_outlay(dec!(625000), &out.result.annual)
    );
    let irr = m.irr_on_concessions.unwrap();
    assert!(m.irr_converged);
    assert!(irr > dec!(0.5) && irr < dec!(0.7), "irr {irr}");
}

#[test]
fn test_effective_rent_reflects_escalations() {
    let out = analyze_lease(&deal(dec!(0.08)), &ScheduleOptions::default()).unwrap();
    let m = &out.result.metrics;
    assert!(m.effective_rent_psf > dec!(40));
    assert_eq!(
        m.effective_rent_psf,
        effective_rent_psf(m.total_net_cash_flow, dec!(10000), dec!(10))
    );
}
