//! Rent and operating-expense escalation resolution.
//!
//! Both families share one resolver: a custom table passes through as given,
//! anything else collapses to a single fixed period over the lease window.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dates::NormalizedDates;
use crate::deal::{DealDefinition, EscalationConfig, EscalationMode, EscalationPeriod};
use crate::types::Rate;

/// Which configuration variant produced the periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationSource {
    Fixed,
    Custom,
}

/// Ordered escalation periods for one charge family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEscalation {
    pub source: EscalationSource,
    pub periods: Vec<EscalationPeriod>,
}

impl NormalizedEscalation {
    /// No escalation at all.
    pub fn flat() -> Self {
        NormalizedEscalation {
            source: EscalationSource::Fixed,
            periods: Vec::new(),
        }
    }

    /// A single annual rate over `[start, end]`.
    pub fn fixed(start: NaiveDate, end: NaiveDate, rate: Rate) -> Self {
        NormalizedEscalation {
            source: EscalationSource::Fixed,
            periods: vec![EscalationPeriod::new(start, end, rate)],
        }
    }
}

/// Rent escalation: config rate, then the first rent row's escalation, then 0.
pub fn resolve_rent_escalation(deal: &DealDefinition, dates: &NormalizedDates) -> NormalizedEscalation {
    let row_rate = deal
        .base_rent_schedule
        .first()
        .and_then(|row| row.escalation_pct);
    resolve(&deal.rent_escalation, row_rate, lease_window(deal, dates))
}

/// Operating escalation: config rate, then `operating.escalation_value`, then 0.
pub fn resolve_operating_escalation(
    deal: &DealDefinition,
    dates: &NormalizedDates,
) -> NormalizedEscalation {
    resolve(
        &deal.operating.escalation,
        deal.operating.escalation_value,
        lease_window(deal, dates),
    )
}

fn resolve(
    config: &EscalationConfig,
    fallback_rate: Option<Rate>,
    window: Option<(NaiveDate, NaiveDate)>,
) -> NormalizedEscalation {
    let (rate, amount_psf, mode) = match config {
        EscalationConfig::Custom { periods } if !periods.is_empty() => {
            return NormalizedEscalation {
                source: EscalationSource::Custom,
                periods: periods.clone(),
            };
        }
        EscalationConfig::Custom { .. } => (None, None, None),
        EscalationConfig::Fixed {
            rate,
            amount_psf,
            mode,
        } => (*rate, *amount_psf, *mode),
    };

    let Some((start, end)) = window else {
        return NormalizedEscalation::flat();
    };

    // A dollar step is only honoured with an explicit mode marker.
    if let (Some(EscalationMode::FixedAmount), Some(amount)) = (mode, amount_psf) {
        let mut period = EscalationPeriod::new(start, end, Decimal::ZERO);
        period.amount_psf = Some(amount);
        return NormalizedEscalation {
            source: EscalationSource::Fixed,
            periods: vec![period],
        };
    }

    let resolved = rate.or(fallback_rate).unwrap_or(Decimal::ZERO);
    NormalizedEscalation::fixed(start, end, resolved)
}

/// Commencement to expiration, falling back to the rent schedule's own span.
fn lease_window(deal: &DealDefinition, dates: &NormalizedDates) -> Option<(NaiveDate, NaiveDate)> {
    let row_starts = || deal.base_rent_schedule.iter().filter_map(|row| row.start);
    let start = dates.commencement.or_else(|| row_starts().min())?;
    let end = dates.expiration.or_else(|| row_starts().max())?;
    Some((start, end))
}
