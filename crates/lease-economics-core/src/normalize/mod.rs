//! Normalization layer.
//!
//! Reconciles the partially-optional deal representations (explicit term vs.
//! dates, fixed vs. custom escalation, at-commencement vs. custom abatement)
//! into one canonical bundle, and reports anything questionable as warnings.

pub mod abatement;
pub mod dates;
pub mod escalation;
pub mod issues;

use serde::{Deserialize, Serialize};

use crate::deal::DealDefinition;

pub use abatement::{resolve_abatement, AbatementPeriod};
pub use dates::{resolve_dates, NormalizedDates, TermSource};
pub use escalation::{
    resolve_operating_escalation, resolve_rent_escalation, EscalationSource, NormalizedEscalation,
};
pub use issues::{collect_issues, IssueCode, NormalizationIssue, Severity};

/// Canonical view of a deal consumed by the schedule builders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBundle {
    pub dates: NormalizedDates,
    pub abatement: Vec<AbatementPeriod>,
    pub rent_escalation: NormalizedEscalation,
    pub operating_escalation: NormalizedEscalation,
}

/// Normalize a deal. Never fails; problems come back as warnings.
pub fn normalize(deal: &DealDefinition) -> (NormalizedBundle, Vec<NormalizationIssue>) {
    let dates = resolve_dates(deal);
    let bundle = NormalizedBundle {
        abatement: resolve_abatement(deal, &dates),
        rent_escalation: resolve_rent_escalation(deal, &dates),
        operating_escalation: resolve_operating_escalation(deal, &dates),
        dates,
    };

    let issues = collect_issues(deal, &bundle);
    for issue in &issues {
        tracing::warn!(
            code = issue.code.as_str(),
            field = issue.field.as_deref().unwrap_or(""),
            "{}",
            issue.message
        );
    }

    (bundle, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deal::{
        AbatementConfig, AbatementInput, EscalationConfig, EscalationMode, EscalationPeriod,
        KeyDates, LeaseTerm, RentRow,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn clean_deal() -> DealDefinition {
        DealDefinition {
            name: "Suite 400".into(),
            rentable_area: dec!(1200),
            key_dates: KeyDates {
                commencement: Some(d(2024, 1, 1)),
                expiration: Some(d(2028, 12, 31)),
                ..Default::default()
            },
            base_rent_schedule: vec![RentRow {
                start: None,
                rent_psf: dec!(30),
                escalation_pct: Some(dec!(0.03)),
            }],
            ..Default::default()
        }
    }

    fn codes(deal: &DealDefinition) -> Vec<IssueCode> {
        normalize(deal).1.into_iter().map(|i| i.code).collect()
    }

    #[test]
    fn test_clean_deal_has_no_issues() {
        assert!(codes(&clean_deal()).is_empty());
    }

    #[test]
    fn test_normalize_does_not_mutate_input() {
        let deal = clean_deal();
        let before = deal.clone();
        let _ = normalize(&deal);
        assert_eq!(deal, before);
    }

    #[test]
    fn test_missing_dates_reported() {
        let mut deal = clean_deal();
        deal.key_dates = KeyDates::default();
        let found = codes(&deal);
        assert!(found.contains(&IssueCode::MissingCommencement));
        assert!(found.contains(&IssueCode::MissingExpiration));
    }

    #[test]
    fn test_out_of_order_dates_reported() {
        let mut deal = clean_deal();
        deal.key_dates.expiration = Some(d(2023, 6, 30));
        deal.key_dates.early_access = Some(d(2024, 2, 1));
        let issues = normalize(&deal).1;
        let fields: Vec<_> = issues
            .iter()
            .filter(|i| i.code == IssueCode::DatesOutOfOrder)
            .filter_map(|i| i.field.clone())
            .collect();
        assert_eq!(fields, vec!["key_dates.expiration", "key_dates.early_access"]);
    }

    #[test]
    fn test_negative_free_months_warns_but_completes() {
        let mut deal = clean_deal();
        deal.concessions.abatement = AbatementConfig::AtCommencement {
            months: -3,
            includes_nnn: false,
        };
        let (bundle, issues) = normalize(&deal);
        assert!(bundle.abatement.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::NegativeFreeRentMonths);
        assert_eq!(issues[0].severity, Severity::Warn);
    }

    #[test]
    fn test_unsorted_and_overlapping_periods_reported_not_fixed() {
        let mut deal = clean_deal();
        let periods = vec![
            EscalationPeriod::new(d(2026, 1, 1), d(2028, 12, 31), dec!(0.03)),
            EscalationPeriod::new(d(2024, 1, 1), d(2026, 6, 30), dec!(0.02)),
            EscalationPeriod::new(d(2026, 1, 1), d(2027, 12, 31), dec!(0.04)),
        ];
        deal.rent_escalation = EscalationConfig::Custom {
            periods: periods.clone(),
        };
        let (bundle, issues) = normalize(&deal);
        assert_eq!(bundle.rent_escalation.periods, periods);
        let found: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            found,
            vec![
                IssueCode::UnsortedEscalationPeriods,
                IssueCode::OverlappingEscalationPeriods
            ]
        );
    }

    #[test]
    fn test_ambiguous_fixed_amount_reported() {
        let mut deal = clean_deal();
        deal.rent_escalation = EscalationConfig::Fixed {
            rate: None,
            amount_psf: Some(dec!(1)),
            mode: None,
        };
        assert_eq!(codes(&deal), vec![IssueCode::AmbiguousEscalationMode]);

        deal.rent_escalation = EscalationConfig::Fixed {
            rate: None,
            amount_psf: None,
            mode: Some(EscalationMode::FixedAmount),
        };
        assert_eq!(codes(&deal), vec![IssueCode::MissingEscalationAmount]);
    }

    #[test]
    fn test_percent_looking_rate_reported() {
        let mut deal = clean_deal();
        deal.base_rent_schedule[0].escalation_pct = Some(dec!(3));
        let issues = normalize(&deal).1;
        assert_eq!(issues[0].code, IssueCode::EscalationRateLooksLikePercent);
        assert_eq!(issues[0].field.as_deref(), Some("rent_escalation.periods[0].rate"));
    }

    #[test]
    fn test_expiration_term_mismatch() {
        let mut deal = clean_deal();
        deal.lease_term = Some(LeaseTerm {
            years: 3,
            months: 0,
            include_abatement_in_term: false,
        });
        assert_eq!(codes(&deal), vec![IssueCode::ExpirationTermMismatch]);
    }

    #[test]
    fn test_overlapping_custom_abatement() {
        let mut deal = clean_deal();
        deal.concessions.abatement = AbatementConfig::Custom {
            periods: vec![
                AbatementInput {
                    start: d(2024, 1, 1),
                    end: Some(d(2024, 3, 31)),
                    free_months: 3,
                    includes_nnn: false,
                },
                AbatementInput {
                    start: d(2024, 3, 1),
                    end: None,
                    free_months: 1,
                    includes_nnn: false,
                },
            ],
        };
        assert_eq!(codes(&deal), vec![IssueCode::OverlappingAbatementPeriods]);
    }

    #[test]
    fn test_rent_rows_and_area() {
        let mut deal = clean_deal();
        deal.rentable_area = dec!(0);
        deal.base_rent_schedule.push(RentRow {
            start: None,
            rent_psf: dec!(32),
            escalation_pct: None,
        });
        assert_eq!(
            codes(&deal),
            vec![IssueCode::RentRowMissingStart, IssueCode::NonPositiveArea]
        );

        deal.base_rent_schedule.clear();
        assert!(codes(&deal).contains(&IssueCode::MissingBaseRent));
    }

    #[test]
    fn test_issue_code_serializes_snake_case() {
        let json = serde_json::to_value(IssueCode::NegativeFreeRentMonths).unwrap();
        assert_eq!(json, serde_json::json!("negative_free_rent_months"));
        assert_eq!(IssueCode::NegativeFreeRentMonths.as_str(), "negative_free_rent_months");
    }
}
