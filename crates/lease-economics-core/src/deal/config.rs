//! Tagged configuration families for escalation and abatement.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

// ---------------------------------------------------------------------------
// Escalation
// ---------------------------------------------------------------------------

/// Explicit marker for how a fixed escalation step is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationMode {
    /// Compounding percentage increase (0.03 = 3%)
    Percent,
    /// Dollar-per-square-foot increase per escalation boundary
    FixedAmount,
}

/// One row of a custom escalation table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Increase applied at each boundary inside the period
    #[serde(default)]
    pub rate: Rate,
    /// Dollar step per boundary (fixed-amount escalations only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_psf: Option<Money>,
    /// Spacing of escalation boundaries, counted from the rent anchor
    #[serde(default = "default_frequency_months")]
    pub frequency_months: u32,
}

fn default_frequency_months() -> u32 {
    12
}

impl EscalationPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate, rate: Rate) -> Self {
        EscalationPeriod {
            start,
            end,
            rate,
            amount_psf: None,
            frequency_months: default_frequency_months(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Rent or operating-expense escalation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EscalationConfig {
    /// One rate (or dollar step) applied annually over the whole term
    Fixed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rate: Option<Rate>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount_psf: Option<Money>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mode: Option<EscalationMode>,
    },
    /// Explicit period table, used in the order supplied
    Custom {
        #[serde(default)]
        periods: Vec<EscalationPeriod>,
    },
}

impl Default for EscalationConfig {
    fn default() -> Self {
        EscalationConfig::Fixed {
            rate: None,
            amount_psf: None,
            mode: None,
        }
    }
}

impl EscalationConfig {
    pub fn fixed_rate(rate: Rate) -> Self {
        EscalationConfig::Fixed {
            rate: Some(rate),
            amount_psf: None,
            mode: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Abatement
// ---------------------------------------------------------------------------

/// One free-rent block of a custom abatement configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbatementInput {
    pub start: NaiveDate,
    /// Defaults to `start + free_months - 1 day`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    pub free_months: i32,
    /// Operating-expense passthroughs are abated as well as base rent
    #[serde(default)]
    pub includes_nnn: bool,
}

/// Free-rent configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbatementConfig {
    #[default]
    None,
    /// A single block of free months starting at commencement
    AtCommencement {
        months: i32,
        #[serde(default)]
        includes_nnn: bool,
    },
    /// Explicit free-rent periods, modeled as in-schedule credits
    Custom {
        #[serde(default)]
        periods: Vec<AbatementInput>,
    },
}

impl AbatementConfig {
    /// Sum of the non-negative free-month counts.
    pub fn total_months(&self) -> u32 {
        match self {
            AbatementConfig::None => 0,
            AbatementConfig::AtCommencement { months, .. } => (*months).max(0) as u32,
            AbatementConfig::Custom { periods } => periods
                .iter()
                .map(|p| p.free_months.max(0) as u32)
                .sum(),
        }
    }
}
