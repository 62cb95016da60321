use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::dates::NormalizedDates;
use crate::calendar::add_months;
use crate::deal::{AbatementConfig, DealDefinition};

/// A canonical free-rent period (closed date range).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub free_months: i32,
    pub includes_nnn: bool,
}

impl AbatementPeriod {
    /// Periods with a non-positive month count carry no credit.
    pub fn is_effective(&self) -> bool {
        self.free_months > 0 && self.end >= self.start
    }
}

/// Resolve the abatement configuration into ordered date ranges.
pub fn resolve_abatement(deal: &DealDefinition, dates: &NormalizedDates) -> Vec<AbatementPeriod> {
    match &deal.concessions.abatement {
        AbatementConfig::None => Vec::new(),
        AbatementConfig::AtCommencement {
            months,
            includes_nnn,
        } => {
            let Some(start) = dates.commencement else {
                return Vec::new();
            };
            if *months <= 0 {
                return Vec::new();
            }
            block_end(start, *months)
                .map(|end| AbatementPeriod {
                    start,
                    end,
                    free_months: *months,
                    includes_nnn: *includes_nnn,
                })
                .into_iter()
                .collect()
        }
        AbatementConfig::Custom { periods } => periods
            .iter()
            .map(|p| AbatementPeriod {
                start: p.start,
                end: p
                    .end
                    .or_else(|| block_end(p.start, p.free_months))
                    .unwrap_or(p.start),
                free_months: p.free_months,
                includes_nnn: p.includes_nnn,
            })
            .collect(),
    }
}

/// Last day of a block of `months` whole months starting at `start`.
fn block_end(start: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months <= 0 {
        return None;
    }
    add_months(start, months as u32).and_then(|d| d.pred_opt())
}
