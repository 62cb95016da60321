use chrono::NaiveDate;
use lease_economics_core::analysis::analyze_lease;
use lease_economics_core::deal::{
    AbatementConfig, AbatementInput, Concessions, DealDefinition, EscalationConfig, EscalationPeriod, Financing,
    KeyDates, LeaseTerm, LeaseType, OperatingTerms, ParkingTerms, RentRow, TransactionCosts,
};
use lease_economics_core::normalize::{normalize, IssueCode};
use lease_economics_core::schedule::{
    build_amortization_schedule, build_annual_legacy, build_monthly_schedule, roll_up_to_annual, PaymentTiming,
    RentConfig, RoundingPolicy, ScheduleOptions,
};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn office_deal() -> DealDefinition {
    DealDefinition {
        name: "Suite 1200".into(),
        rentable_area: dec!(1200),
        key_dates: KeyDates {
            commencement: Some(d(2024, 1, 1)),
            expiration: Some(d(2028, 12, 31)),
            ..Default::default()
        },
        base_rent_schedule: vec![RentRow {
            start: None,
            rent_psf: dec!(30),
            escalation_pct: None,
        }],
        concessions: Concessions {
            abatement: AbatementConfig::AtCommencement {
                months: 2,
                includes_nnn: false,
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

// ===========================================================================
// Monthly schedule
// ===========================================================================

#[test]
fn test_two_free_months_known_answer() {
    let deal = office_deal();
    let (bundle, issues) = normalize(&deal);
    assert!(issues.is_empty());
    let rent = RentConfig::from_deal(&deal, &bundle);
    let s = build_monthly_schedule(&bundle, &rent, deal.rentable_area, &ScheduleOptions::default());

    assert_eq!(s.months[0].net_rent_due, Decimal::ZERO);
    assert_eq!(s.months[1].net_rent_due, Decimal::ZERO);
    for m in &s.months[2..] {
        assert_eq!(m.net_rent_due, dec!(3000));
    }
    assert_eq!(s.summary.free_rent_value, dec!(6000));
}

#[test]
fn test_term_with_and_without_abatement_extension() {
    for (include, expected) in [(true, 14), (false, 12)] {
        let mut deal = office_deal();
        deal.key_dates.expiration = None;
        deal.lease_term = Some(LeaseTerm {
            years: 1,
            months: 0,
            include_abatement_in_term: include,
        });
        let (bundle, _) = normalize(&deal);
        let rent = RentConfig::from_deal(&deal, &bundle);
        let s = build_monthly_schedule(&bundle, &rent, deal.rentable_area, &ScheduleOptions::default());
        assert_eq!(s.months.len(), expected, "include_abatement_in_term = {include}");
    }
}

#[test]
fn test_month_end_commencement_does_not_drift() {
    let mut deal = office_deal();
    deal.concessions.abatement = AbatementConfig::None;
    deal.key_dates.commencement = Some(d(2024, 1, 31));
    deal.key_dates.expiration = Some(d(2024, 6, 29));
    let (bundle, _) = normalize(&deal);
    let rent = RentConfig::from_deal(&deal, &bundle);
    let s = build_monthly_schedule(&bundle, &rent, deal.rentable_area, &ScheduleOptions::default());

    let starts: Vec<_> = s.months.iter().map(|m| m.start).collect();
    assert_eq!(
        starts,
        vec![d(2024, 1, 31), d(2024, 2, 29), d(2024, 3, 31), d(2024, 4, 30), d(2024, 5, 31)]
    );
    assert_eq!(s.months[0].end, d(2024, 2, 28));
    assert_eq!(s.months[4].end, d(2024, 6, 29));
}

#[test]
fn test_custom_escalation_table_drives_rent() {
    let mut deal = office_deal();
    deal.concessions.abatement = AbatementConfig::None;
    deal.rent_escalation = EscalationConfig::Custom {
        periods: vec![
            EscalationPeriod::new(d(2024, 1, 1), d(2025, 12, 31), dec!(0.02)),
            EscalationPeriod::new(d(2026, 1, 1), d(2028, 12, 31), dec!(0.04)),
        ],
    };
    let (bundle, _) = normalize(&deal);
    let rent = RentConfig::from_deal(&deal, &bundle);
    let s = build_monthly_schedule(&bundle, &rent, deal.rentable_area, &ScheduleOptions::default());
    assert_eq!(s.months[0].base_rent, dec!(3000));
    assert_eq!(s.months[12].base_rent, dec!(3060));
    assert_eq!(s.months[24].base_rent, dec!(3182.40));
}

#[test]
fn test_stepped_rent_rows() {
    let mut deal = office_deal();
    deal.concessions.abatement = AbatementConfig::None;
    deal.base_rent_schedule.push(RentRow {
        start: Some(d(2026, 1, 1)),
        rent_psf: dec!(36),
        escalation_pct: None,
    });
    let (bundle, _) = normalize(&deal);
    let rent = RentConfig::from_deal(&deal, &bundle);
    let s = build_monthly_schedule(&bundle, &rent, deal.rentable_area, &ScheduleOptions::default());
    assert_eq!(s.months[23].base_rent, dec!(3000));
    assert_eq!(s.months[24].base_rent, dec!(3600));
}

#[test]
fn test_negative_custom_abatement_ignored_with_warning() {
    let mut deal = office_deal();
    deal.concessions.abatement = AbatementConfig::Custom {
        periods: vec![AbatementInput {
            start: d(2024, 3, 1),
            end: Some(d(2024, 3, 31)),
            free_months: -1,
            includes_nnn: false,
        }],
    };
    let (bundle, issues) = normalize(&deal);
    assert_eq!(issues[0].code, IssueCode::NegativeFreeRentMonths);
    let rent = RentConfig::from_deal(&deal, &bundle);
    let s = build_monthly_schedule(&bundle, &rent, deal.rentable_area, &ScheduleOptions::default());
    assert_eq!(s.summary.free_rent_value, Decimal::ZERO);
}

#[test]
fn test_rounding_and_timing_options() {
    let mut deal = office_deal();
    deal.rentable_area = dec!(1111);
    let options = ScheduleOptions {
        payment_timing: PaymentTiming::Arrears,
        rounding: RoundingPolicy::Cent,
    };
    let (bundle, _) = normalize(&deal);
    let rent = RentConfig::from_deal(&deal, &bundle);
    let s = build_monthly_schedule(&bundle, &rent, deal.rentable_area, &options);
    // 30 * 1111 / 12 = 2777.5
    assert_eq!(s.months[2].base_rent, dec!(2777.50));
    assert_eq!(s.months[2].payment_date, d(2024, 3, 31));
}

// ===========================================================================
// Annual roll-up
// ===========================================================================

#[test]
fn test_annual_roll_up_reconciles_with_monthly() {
    let mut deal = office_deal();
    deal.lease_type = LeaseType::TripleNet;
    deal.operating = OperatingTerms {
        expense_psf: dec!(11.50),
        escalation_value: Some(dec!(0.03)),
        ..Default::default()
    };
    deal.parking = Some(ParkingTerms {
        spaces: 3,
        monthly_rate_per_space: dec!(175),
        annual_escalation: dec!(0.05),
    });
    deal.concessions.ti_build_cost_psf = Some(dec!(20));
    deal.transaction_costs = Some(TransactionCosts {
        brokerage: dec!(9000),
        ..Default::default()
    });
    deal.financing = Some(Financing {
        amortize_free_rent: true,
        amortize_transaction_costs: true,
        method: lease_economics_core::deal::AmortizationMethod::Amortized,
        annual_rate: dec!(0.07),
        ..Default::default()
    });

    let out = analyze_lease(&deal, &ScheduleOptions::default()).unwrap();
    let a = &out.result;
    let monthly: Decimal = a.monthly.months.iter().map(|m| m.net_cash_flow).sum();
    let annual: Decimal = a.annual.iter().map(|y| y.net_cash_flow).sum();
    assert!((monthly - annual).abs() < dec!(0.000001));

    for y in &a.annual {
        assert_eq!(y.subtotal, y.base_rent + y.operating + y.parking + y.other_recurring);
        assert_eq!(
            y.net_cash_flow,
            y.subtotal + y.abatement_credit + y.ti_shortfall + y.transaction_costs + y.amortized_costs
        );
    }
    assert_eq!(a.annual[0].ti_shortfall, dec!(-24000));
    assert_eq!(a.annual[0].transaction_costs, dec!(-9000));
}

#[test]
fn test_legacy_annual_path_matches_roll_up() {
    let mut deal = office_deal();
    deal.base_rent_schedule[0].escalation_pct = Some(dec!(0.035));
    let (bundle, _) = normalize(&deal);
    let rent = RentConfig::from_deal(&deal, &bundle);
    let s = build_monthly_schedule(&bundle, &rent, deal.rentable_area, &ScheduleOptions::default());
    assert_eq!(
        build_annual_legacy(&bundle, &rent, deal.rentable_area),
        roll_up_to_annual(&s.months)
    );
}

// ===========================================================================
// Amortization
// ===========================================================================

#[test]
fn test_amortization_zero_rate_known_answer() {
    let rows = build_amortization_schedule(dec!(1200), Decimal::ZERO, 12);
    assert!(rows.iter().all(|r| r.principal == dec!(100) && r.interest.is_zero()));
    assert_eq!(rows.last().unwrap().ending_balance, Decimal::ZERO);
}

#[test]
fn test_amortization_positive_rate_ends_near_zero() {
    let principal = dec!(250000);
    let rows = build_amortization_schedule(principal, dec!(0.065), 120);
    let last = rows.last().unwrap();
    assert!((last.ending_balance / principal).abs() < dec!(0.000001));
    let interest: Decimal = rows.iter().map(|r| r.interest).sum();
    assert!(interest > Decimal::ZERO);
}

// ===========================================================================
// Long terms
// ===========================================================================

fn fifty_year_deal() -> DealDefinition {
    let mut deal = office_deal();
    deal.key_dates.expiration = Some(d(2073, 12, 31));
    deal.concessions = Concessions::default();
    deal
}

#[test]
fn test_percent_typed_escalation_over_fifty_years_is_bounded() {
    let mut deal = fifty_year_deal();
    deal.base_rent_schedule[0].escalation_pct = Some(dec!(3));

    let out = analyze_lease(&deal, &ScheduleOptions::default()).unwrap();
    let codes: Vec<_> = out.result.issues.iter().map(|i| i.code).collect();
    assert!(codes.contains(&IssueCode::EscalationRateLooksLikePercent));
    assert!(codes.contains(&IssueCode::EscalationOverflow));
    assert!(!out.warnings.is_empty());

    let months = &out.result.monthly.months;
    assert_eq!(months.len(), 600);
    let last = months.last().unwrap().net_rent_due;
    assert_eq!(last, months[months.len() - 13].net_rent_due);
    assert!(last > Decimal::ZERO);
}

#[test]
fn test_realistic_escalation_over_fifty_years_is_not_flagged() {
    let mut deal = fifty_year_deal();
    deal.base_rent_schedule[0].escalation_pct = Some(dec!(0.03));
    let (_, issues) = normalize(&deal);
    assert!(issues.iter().all(|i| i.code != IssueCode::EscalationOverflow));
}

#[test]
fn test_financed_costs_over_forty_years_at_percent_typed_rate() {
    let mut deal = office_deal();
    deal.key_dates.expiration = Some(d(2063, 12, 31));
    deal.transaction_costs = Some(TransactionCosts {
        brokerage: dec!(50000),
        legal: dec!(10000),
        other: Decimal::ZERO,
    });
    deal.financing = Some(Financing {
        amortize_transaction_costs: true,
        method: lease_economics_core::deal::AmortizationMethod::Amortized,
        annual_rate: dec!(7),
        ..Default::default()
    });

    let out = analyze_lease(&deal, &ScheduleOptions::default()).unwrap();
    let rows = &out.result.amortization;
    assert_eq!(rows.len(), 480);
    assert_eq!(rows.last().unwrap().ending_balance, Decimal::ZERO);
}
