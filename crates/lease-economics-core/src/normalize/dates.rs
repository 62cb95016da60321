//! Date/term resolution.
//!
//! Collapses the explicit-term and derived-from-dates representations into
//! one canonical set of dates and an integer month count, so nothing
//! downstream has to reason about calendar edge cases again.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{add_months, is_end_of_month, months_between};
use crate::deal::{AbatementConfig, DealDefinition};

/// Where the total term came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermSource {
    /// `lease_term` years + months
    Explicit,
    /// Calendar difference between commencement and expiration
    Dates,
    /// Not enough information to size the term
    Unresolved,
}

/// Canonical date bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDates {
    pub commencement: Option<NaiveDate>,
    pub rent_start: Option<NaiveDate>,
    pub expiration: Option<NaiveDate>,
    pub early_access: Option<NaiveDate>,
    pub term_months: u32,
    pub term_years: u32,
    pub term_remainder_months: u32,
    pub abatement_months: u32,
    pub abatement_in_term: bool,
    pub term_source: TermSource,
}

/// Resolve commencement, rent start, expiration and the total term.
pub fn resolve_dates(deal: &DealDefinition) -> NormalizedDates {
    let key = &deal.key_dates;
    let commencement = key.commencement.or_else(|| {
        deal.base_rent_schedule
            .first()
            .and_then(|row| row.start)
    });

    let abatement_months = deal.concessions.abatement.total_months();

    let rent_start = key.rent_start.or_else(|| match deal.concessions.abatement {
        AbatementConfig::AtCommencement { .. } if abatement_months > 0 => {
            commencement.and_then(|c| add_months(c, abatement_months))
        }
        _ => commencement,
    });

    let explicit_term = deal.lease_term.as_ref().and_then(|t| {
        let extra = if t.include_abatement_in_term { abatement_months } else { 0 };
        t.years
            .checked_mul(12)
            .and_then(|m| m.checked_add(t.months))
            .and_then(|m| m.checked_add(extra))
            .filter(|total| *total > 0)
            .map(|total| (t, total))
    });

    let (term_months, expiration, abatement_in_term, term_source) = match explicit_term {
        Some((term, total)) => {
            let include = term.include_abatement_in_term;
            let expiration = match commencement {
                Some(c) => add_months(c, total).and_then(|d| d.pred_opt()),
                None => key.expiration,
            };
            (total, expiration, include, TermSource::Explicit)
        }
        None => match (commencement, key.expiration) {
            (Some(c), Some(e)) => (
                term_from_dates(c, e),
                Some(e),
                false,
                TermSource::Dates,
            ),
            _ => (0, key.expiration, false, TermSource::Unresolved),
        },
    };

    NormalizedDates {
        commencement,
        rent_start,
        expiration,
        early_access: key.early_access,
        term_months,
        term_years: term_months / 12,
        term_remainder_months: term_months % 12,
        abatement_months,
        abatement_in_term,
        term_source,
    }
}

/// Whole months between the dates, plus one when the lease expires on the
/// last day of a month (full-month billing of the final month).
fn term_from_dates(commencement: NaiveDate, expiration: NaiveDate) -> u32 {
    if expiration < commencement {
        return 0;
    }
    let mut months = months_between(commencement, expiration) as u32;
    if is_end_of_month(expiration) {
        months += 1;
    }
    months
}
