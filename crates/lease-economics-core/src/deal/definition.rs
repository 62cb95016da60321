use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config::{AbatementConfig, EscalationConfig};
use crate::types::{Area, Money, Rate};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Whether operating expenses are billed separately from base rent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseType {
    /// Operating expenses included in the quoted rent
    #[default]
    FullService,
    /// Tenant reimburses operating expenses on top of base rent (NNN)
    TripleNet,
}

/// How financed cost pools are spread across the term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationMethod {
    /// Equal principal each month, no interest
    #[default]
    StraightLine,
    /// Level payment at the financing rate
    Amortized,
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Key lease dates. Any of them may be absent; the normalizer resolves the
/// canonical set and reports what it could not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyDates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commencement: Option<NaiveDate>,
    /// Explicit rent commencement (overrides the abatement-derived date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub early_access: Option<NaiveDate>,
}

/// Explicit lease term. Takes precedence over the expiration date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaseTerm {
    pub years: u32,
    #[serde(default)]
    pub months: u32,
    /// Extend the term by the abatement months
    #[serde(default)]
    pub include_abatement_in_term: bool,
}

/// Operating-expense terms (annual $/SF).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatingTerms {
    #[serde(default)]
    pub expense_psf: Money,
    /// Fallback escalation rate when the config carries none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_value: Option<Rate>,
    #[serde(default)]
    pub escalation: EscalationConfig,
}

/// One row of the base rent schedule (annual $/SF).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RentRow {
    /// Date the row takes effect; the first row defaults to commencement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    pub rent_psf: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_pct: Option<Rate>,
}

/// Landlord concessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Concessions {
    #[serde(default)]
    pub ti_allowance_psf: Money,
    /// Budgeted build-out cost; the excess over the allowance is the TI shortfall
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ti_build_cost_psf: Option<Money>,
    #[serde(default)]
    pub abatement: AbatementConfig,
    #[serde(default)]
    pub moving_allowance: Money,
    #[serde(default)]
    pub other_credits: Money,
}

/// Parking charges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParkingTerms {
    pub spaces: u32,
    pub monthly_rate_per_space: Money,
    #[serde(default)]
    pub annual_escalation: Rate,
}

/// Any other recurring monthly charge (storage, signage, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecurringCharge {
    pub label: String,
    pub monthly_amount: Money,
    #[serde(default)]
    pub annual_escalation: Rate,
}

/// One-time transaction costs borne at commencement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionCosts {
    #[serde(default)]
    pub brokerage: Money,
    #[serde(default)]
    pub legal: Money,
    #[serde(default)]
    pub other: Money,
}

impl TransactionCosts {
    pub fn total(&self) -> Money {
        self.brokerage + self.legal + self.other
    }
}

/// Financing election: which cost pools are recovered over the term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Financing {
    #[serde(default)]
    pub amortize_ti_shortfall: bool,
    #[serde(default)]
    pub amortize_free_rent: bool,
    #[serde(default)]
    pub amortize_transaction_costs: bool,
    #[serde(default)]
    pub method: AmortizationMethod,
    #[serde(default)]
    pub annual_rate: Rate,
}

/// Complete description of a lease deal. Never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealDefinition {
    #[serde(default)]
    pub name: String,
    /// Rentable square feet
    pub rentable_area: Area,
    #[serde(default)]
    pub lease_type: LeaseType,
    #[serde(default)]
    pub key_dates: KeyDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lease_term: Option<LeaseTerm>,
    #[serde(default)]
    pub operating: OperatingTerms,
    #[serde(default)]
    pub base_rent_schedule: Vec<RentRow>,
    #[serde(default)]
    pub rent_escalation: EscalationConfig,
    #[serde(default)]
    pub concessions: Concessions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<ParkingTerms>,
    #[serde(default)]
    pub other_charges: Vec<RecurringCharge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_costs: Option<TransactionCosts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financing: Option<Financing>,
    /// Annual discount rate for NPV
    #[serde(default)]
    pub discount_rate: Rate,
}

impl DealDefinition {
    /// Total TI allowance in dollars.
    pub fn ti_allowance(&self) -> Money {
        self.concessions.ti_allowance_psf * self.rentable_area
    }

    /// Build-out cost above the allowance, in dollars (never negative).
    pub fn ti_shortfall(&self) -> Money {
        match self.concessions.ti_build_cost_psf {
            Some(cost) => ((cost - self.concessions.ti_allowance_psf) * self.rentable_area)
                .max(Decimal::ZERO),
            None => Decimal::ZERO,
        }
    }

    pub fn transaction_cost_total(&self) -> Money {
        self.transaction_costs
            .as_ref()
            .map(TransactionCosts::total)
            .unwrap_or(Decimal::ZERO)
    }

    /// Upfront concession outlay: TI allowance, moving allowance and other credits.
    pub fn upfront_concessions(&self) -> Money {
        self.ti_allowance() + self.concessions.moving_allowance + self.concessions.other_credits
    }
}
