//! Issue collector: non-fatal consistency warnings about a deal.
//!
//! Normalization never fails. Everything questionable about the input is
//! reported here and the pipeline carries on with best-effort values.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::NormalizedBundle;
use super::dates::TermSource;
use super::escalation::NormalizedEscalation;
use crate::deal::{
    AbatementConfig, AbatementInput, DealDefinition, EscalationConfig, EscalationMode, EscalationPeriod, LeaseType,
};
use crate::calendar::add_months;
use crate::schedule::{EscalatedRate, RentConfig, ESCALATION_CEILING};
use crate::types::Money;

/// Issue severity. Normalization only ever warns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warn,
}

/// Stable issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    MissingCommencement,
    MissingExpiration,
    DatesOutOfOrder,
    ExpirationTermMismatch,
    NegativeFreeRentMonths,
    OverlappingAbatementPeriods,
    UnsortedAbatementPeriods,
    UnsortedEscalationPeriods,
    OverlappingEscalationPeriods,
    InvertedPeriod,
    EmptyCustomEscalation,
    AmbiguousEscalationMode,
    MissingEscalationAmount,
    EscalationRateLooksLikePercent,
    EscalationOverflow,
    MissingBaseRent,
    RentRowMissingStart,
    NonPositiveArea,
}

impl IssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCode::MissingCommencement => "missing_commencement",
            IssueCode::MissingExpiration => "missing_expiration",
            IssueCode::DatesOutOfOrder => "dates_out_of_order",
            IssueCode::ExpirationTermMismatch => "expiration_term_mismatch",
            IssueCode::NegativeFreeRentMonths => "negative_free_rent_months",
            IssueCode::OverlappingAbatementPeriods => "overlapping_abatement_periods",
            IssueCode::UnsortedAbatementPeriods => "unsorted_abatement_periods",
            IssueCode::UnsortedEscalationPeriods => "unsorted_escalation_periods",
            IssueCode::OverlappingEscalationPeriods => "overlapping_escalation_periods",
            IssueCode::InvertedPeriod => "inverted_period",
            IssueCode::EmptyCustomEscalation => "empty_custom_escalation",
            IssueCode::AmbiguousEscalationMode => "ambiguous_escalation_mode",
            IssueCode::MissingEscalationAmount => "missing_escalation_amount",
            IssueCode::EscalationRateLooksLikePercent => "escalation_rate_looks_like_percent",
            IssueCode::EscalationOverflow => "escalation_overflow",
            IssueCode::MissingBaseRent => "missing_base_rent",
            IssueCode::RentRowMissingStart => "rent_row_missing_start",
            IssueCode::NonPositiveArea => "non_positive_area",
        }
    }
}

/// A single normalization warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl NormalizationIssue {
    pub fn warn(code: IssueCode, message: impl Into<String>, field: impl Into<String>) -> Self {
        NormalizationIssue {
            severity: Severity::Warn,
            code,
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

/// Scan the raw deal and its normalized bundle for inconsistencies.
pub fn collect_issues(deal: &DealDefinition, bundle: &NormalizedBundle) -> Vec<NormalizationIssue> {
    let mut issues = Vec::new();
    check_dates(deal, bundle, &mut issues);
    check_abatement(deal, &mut issues);
    check_escalation(&deal.rent_escalation, "rent_escalation", &mut issues);
    check_escalation(&deal.operating.escalation, "operating.escalation", &mut issues);
    check_rates(bundle, &mut issues);
    check_escalation_ceiling(deal, bundle, &mut issues);
    check_rent_rows(deal, &mut issues);

    if deal.rentable_area <= Decimal::ZERO {
        issues.push(NormalizationIssue::warn(
            IssueCode::NonPositiveArea,
            format!("Rentable area {} is not positive; rent amounts will be zero", deal.rentable_area),
            "rentable_area",
        ));
    }

    issues
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

fn check_dates(deal: &DealDefinition, bundle: &NormalizedBundle, issues: &mut Vec<NormalizationIssue>) {
    let dates = &bundle.dates;

    if deal.key_dates.commencement.is_none() {
        let message = match dates.commencement {
            Some(c) => format!("Commencement date missing; using first rent row start {c}"),
            None => "Commencement date missing; no schedule can be built".to_string(),
        };
        issues.push(NormalizationIssue::warn(
            IssueCode::MissingCommencement,
            message,
            "key_dates.commencement",
        ));
    }

    if dates.term_source == TermSource::Unresolved && dates.expiration.is_none() {
        issues.push(NormalizationIssue::warn(
            IssueCode::MissingExpiration,
            "Neither an expiration date nor a lease term was supplied",
            "key_dates.expiration",
        ));
    }

    if let Some(commencement) = dates.commencement {
        if let Some(expiration) = dates.expiration {
            if expiration < commencement {
                issues.push(NormalizationIssue::warn(
                    IssueCode::DatesOutOfOrder,
                    format!("Expiration {expiration} precedes commencement {commencement}"),
                    "key_dates.expiration",
                ));
            }
        }
        if let Some(rent_start) = dates.rent_start {
            if rent_start < commencement {
                issues.push(NormalizationIssue::warn(
                    IssueCode::DatesOutOfOrder,
                    format!("Rent start {rent_start} precedes commencement {commencement}"),
                    "key_dates.rent_start",
                ));
            }
        }
        if let Some(early) = dates.early_access {
            if early > commencement {
                issues.push(NormalizationIssue::warn(
                    IssueCode::DatesOutOfOrder,
                    format!("Early access {early} falls after commencement {commencement}"),
                    "key_dates.early_access",
                ));
            }
        }
    }

    if dates.term_source == TermSource::Explicit {
        if let (Some(supplied), Some(derived)) = (deal.key_dates.expiration, dates.expiration) {
            if supplied != derived {
                issues.push(NormalizationIssue::warn(
                    IssueCode::ExpirationTermMismatch,
                    format!(
                        "Supplied expiration {supplied} disagrees with the explicit term; using {derived}"
                    ),
                    "key_dates.expiration",
                ));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Abatement
// ---------------------------------------------------------------------------

fn check_abatement(deal: &DealDefinition, issues: &mut Vec<NormalizationIssue>) {
    match &deal.concessions.abatement {
        AbatementConfig::None => {}
        AbatementConfig::AtCommencement { months, .. } => {
            if *months < 0 {
                issues.push(NormalizationIssue::warn(
                    IssueCode::NegativeFreeRentMonths,
                    format!("Free-rent months {months} is negative; treated as zero"),
                    "concessions.abatement.months",
                ));
            }
        }
        AbatementConfig::Custom { periods } => {
            for (i, p) in periods.iter().enumerate() {
                if p.free_months < 0 {
                    issues.push(NormalizationIssue::warn(
                        IssueCode::NegativeFreeRentMonths,
                        format!("Free-rent months {} is negative; period ignored", p.free_months),
                        format!("concessions.abatement.periods[{i}].free_months"),
                    ));
                }
                if let Some(end) = p.end {
                    if end < p.start {
                        issues.push(NormalizationIssue::warn(
                            IssueCode::InvertedPeriod,
                            format!("Abatement period ends {end} before it starts {}", p.start),
                            format!("concessions.abatement.periods[{i}]"),
                        ));
                    }
                }
            }
            for i in 1..periods.len() {
                let (prev_start, prev_end) = abatement_range(&periods[i - 1]);
                let (start, end) = abatement_range(&periods[i]);
                if start < prev_start {
                    issues.push(NormalizationIssue::warn(
                        IssueCode::UnsortedAbatementPeriods,
                        format!("Abatement period {i} starts before period {}", i - 1),
                        format!("concessions.abatement.periods[{i}]"),
                    ));
                }
                if start <= prev_end && prev_start <= end {
                    issues.push(NormalizationIssue::warn(
                        IssueCode::OverlappingAbatementPeriods,
                        format!("Abatement period {i} overlaps period {}", i - 1),
                        format!("concessions.abatement.periods[{i}]"),
                    ));
                }
            }
        }
    }
}

/// Covered dates of a custom abatement input, with the default end applied.
fn abatement_range(p: &AbatementInput) -> (NaiveDate, NaiveDate) {
    let end = p
        .end
        .or_else(|| add_months(p.start, p.free_months.max(0) as u32).and_then(|d| d.pred_opt()))
        .unwrap_or(p.start);
    (p.start, end.max(p.start))
}

// ---------------------------------------------------------------------------
// Escalation
// ---------------------------------------------------------------------------

fn check_escalation(config: &EscalationConfig, path: &str, issues: &mut Vec<NormalizationIssue>) {
    match config {
        EscalationConfig::Custom { periods } if periods.is_empty() => {
            issues.push(NormalizationIssue::warn(
                IssueCode::EmptyCustomEscalation,
                "Custom escalation has no periods; falling back to a fixed rate",
                format!("{path}.periods"),
            ));
        }
        EscalationConfig::Custom { periods } => check_period_order(periods, path, issues),
        EscalationConfig::Fixed {
            amount_psf, mode, ..
        } => match (amount_psf, mode) {
            (Some(amount), None) => issues.push(NormalizationIssue::warn(
                IssueCode::AmbiguousEscalationMode,
                format!(
                    "Escalation amount {amount} supplied without a mode marker; amount ignored"
                ),
                format!("{path}.amount_psf"),
            )),
            (None, Some(EscalationMode::FixedAmount)) => issues.push(NormalizationIssue::warn(
                IssueCode::MissingEscalationAmount,
                "Fixed-amount escalation selected without an amount; using the percentage rate",
                format!("{path}.amount_psf"),
            )),
            _ => {}
        },
    }
}

fn check_period_order(periods: &[EscalationPeriod], path: &str, issues: &mut Vec<NormalizationIssue>) {
    for (i, p) in periods.iter().enumerate() {
        if p.end < p.start {
            issues.push(NormalizationIssue::warn(
                IssueCode::InvertedPeriod,
                format!("Escalation period ends {} before it starts {}", p.end, p.start),
                format!("{path}.periods[{i}]"),
            ));
        }
        if i == 0 {
            continue;
        }
        let prev = &periods[i - 1];
        if p.start < prev.start {
            issues.push(NormalizationIssue::warn(
                IssueCode::UnsortedEscalationPeriods,
                format!("Escalation period {i} starts before period {}", i - 1),
                format!("{path}.periods[{i}]"),
            ));
        } else if p.start <= prev.end {
            issues.push(NormalizationIssue::warn(
                IssueCode::OverlappingEscalationPeriods,
                format!("Escalation period {i} overlaps period {}", i - 1),
                format!("{path}.periods[{i}]"),
            ));
        }
    }
}

fn check_rates(bundle: &NormalizedBundle, issues: &mut Vec<NormalizationIssue>) {
    let families = [
        ("rent_escalation", &bundle.rent_escalation),
        ("operating.escalation", &bundle.operating_escalation),
    ];
    for (path, escalation) in families {
        for (i, p) in escalation.periods.iter().enumerate() {
            if p.rate > Decimal::ONE {
                issues.push(NormalizationIssue::warn(
                    IssueCode::EscalationRateLooksLikePercent,
                    format!(
                        "Escalation rate {} exceeds 100%; rates are decimals (0.03 = 3%)",
                        p.rate
                    ),
                    format!("{path}.periods[{i}].rate"),
                ));
            }
        }
    }
}

/// Warn for every charge whose escalation stops at the ceiling before
/// expiration.
fn check_escalation_ceiling(deal: &DealDefinition, bundle: &NormalizedBundle, issues: &mut Vec<NormalizationIssue>) {
    let (Some(commencement), Some(expiration)) = (bundle.dates.commencement, bundle.dates.expiration) else {
        return;
    };
    let mut report = |path: &str, saturates: bool| {
        if saturates {
            issues.push(NormalizationIssue::warn(
                IssueCode::EscalationOverflow,
                format!(
                    "Escalation compounds past {ESCALATION_CEILING} before expiration {expiration}; \
                     later increases are not applied"
                ),
                path,
            ));
        }
    };

    let rent = RentConfig::from_deal(deal, bundle);
    let rent_rate = EscalatedRate::new(&rent.steps, &bundle.rent_escalation);
    report("rent_escalation", rent_rate.saturates_by(expiration));

    if deal.lease_type == LeaseType::TripleNet {
        let operating =
            EscalatedRate::single(commencement, deal.operating.expense_psf, &bundle.operating_escalation);
        report("operating.escalation", operating.saturates_by(expiration));
    }

    let anniversary = |base: Money, rate| {
        let escalation = NormalizedEscalation::fixed(commencement, expiration, rate);
        EscalatedRate::single(commencement, base, &escalation).saturates_by(expiration)
    };
    if let Some(parking) = &deal.parking {
        report(
            "parking.annual_escalation",
            anniversary(
                Decimal::from(parking.spaces) * parking.monthly_rate_per_space * dec!(12),
                parking.annual_escalation,
            ),
        );
    }
    for (i, charge) in deal.other_charges.iter().enumerate() {
        report(
            &format!("other_charges[{i}].annual_escalation"),
            anniversary(charge.monthly_amount * dec!(12), charge.annual_escalation),
        );
    }
}

// ---------------------------------------------------------------------------
// Rent rows
// ---------------------------------------------------------------------------

fn check_rent_rows(deal: &DealDefinition, issues: &mut Vec<NormalizationIssue>) {
    if deal.base_rent_schedule.is_empty() {
        issues.push(NormalizationIssue::warn(
            IssueCode::MissingBaseRent,
            "Base rent schedule is empty; base rent will be zero",
            "base_rent_schedule",
        ));
        return;
    }
    for (i, row) in deal.base_rent_schedule.iter().enumerate().skip(1) {
        if row.start.is_none() {
            issues.push(NormalizationIssue::warn(
                IssueCode::RentRowMissingStart,
                format!("Rent row {i} has no start date; row ignored"),
                format!("base_rent_schedule[{i}].start"),
            ));
        }
    }
}
