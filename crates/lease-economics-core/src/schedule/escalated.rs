//! Stepped, escalating annual rates evaluated over date ranges.
//!
//! Shared by base rent, operating recoveries, parking and other charges. A
//! rate is a list of steps (a base value taking effect on a date) plus the
//! normalized escalation periods. Escalation boundaries fall at
//! `step.start + k * frequency_months` (k >= 1); each boundary is charged to
//! the first period, in the order given, that contains it. Compounding stops
//! once the value would pass [`ESCALATION_CEILING`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calendar::{add_months, days_inclusive};
use crate::deal::EscalationPeriod;
use crate::normalize::NormalizedEscalation;
use crate::types::Money;

/// Bound on an escalated annual value.
pub const ESCALATION_CEILING: Money = dec!(1000000000000);

/// A base annual value taking effect on `start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateStep {
    pub start: NaiveDate,
    pub base: Money,
}

/// Escalating rate over a set of steps.
#[derive(Debug, Clone)]
pub struct EscalatedRate<'a> {
    steps: Vec<RateStep>,
    escalation: &'a NormalizedEscalation,
}

impl<'a> EscalatedRate<'a> {
    pub fn new(steps: &[RateStep], escalation: &'a NormalizedEscalation) -> Self {
        let mut steps = steps.to_vec();
        steps.sort_by_key(|s| s.start);
        EscalatedRate { steps, escalation }
    }

    pub fn single(start: NaiveDate, base: Money, escalation: &'a NormalizedEscalation) -> Self {
        EscalatedRate {
            steps: vec![RateStep { start, base }],
            escalation,
        }
    }

    fn active_step(&self, date: NaiveDate) -> Option<&RateStep> {
        self.steps.iter().rev().find(|s| s.start <= date)
    }

    /// Annual rate in effect on `date` (zero before the first step).
    pub fn rate_on(&self, date: NaiveDate) -> Money {
        self.escalate(date).0
    }

    /// Whether escalation through `date` stops at the ceiling.
    pub fn saturates_by(&self, date: NaiveDate) -> bool {
        self.escalate(date).1
    }

    fn escalate(&self, date: NaiveDate) -> (Money, bool) {
        let Some(step) = self.active_step(date) else {
            return (Decimal::ZERO, false);
        };
        let mut value = step.base;
        for (_, period) in self.boundaries(step.start, date) {
            let next = match period.amount_psf {
                Some(amount) => value.checked_add(amount),
                None => value.checked_mul(Decimal::ONE + period.rate),
            };
            match next {
                Some(v) if v.abs() <= ESCALATION_CEILING => value = v,
                _ => return (value, true),
            }
        }
        (value, false)
    }

    /// Escalation boundaries in `(anchor, until]`, chronological.
    fn boundaries(&self, anchor: NaiveDate, until: NaiveDate) -> Vec<(NaiveDate, &EscalationPeriod)> {
        let mut found: Vec<(NaiveDate, &EscalationPeriod)> = Vec::new();
        for period in &self.escalation.periods {
            let frequency = period.frequency_months.max(1);
            let mut k = 1u32;
            while let Some(boundary) = add_months(anchor, k * frequency) {
                if boundary > until || boundary > period.end {
                    break;
                }
                if period.contains(boundary) && !found.iter().any(|(b, _)| *b == boundary) {
                    found.push((boundary, period));
                }
                k += 1;
            }
        }
        found.sort_by_key(|(b, _)| *b);
        found
    }

    /// Dates inside `(start, end]` where the rate may change.
    fn change_points(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut points: Vec<NaiveDate> = self
            .steps
            .iter()
            .map(|s| s.start)
            .filter(|d| *d > start && *d <= end)
            .collect();
        if let Some(step) = self.active_step(end) {
            points.extend(
                self.boundaries(step.start, end)
                    .into_iter()
                    .map(|(b, _)| b)
                    .filter(|b| *b > start),
            );
        }
        points.sort();
        points.dedup();
        points
    }

    /// Charge for `[start, end]` within a billing month whose natural last day
    /// is `natural_end`: `rate / 12 * units`, day-weighted across any change
    /// points and prorated when `end` falls before `natural_end`.
    pub fn amount_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        natural_end: NaiveDate,
        units: Decimal,
    ) -> Money {
        let natural_days = Decimal::from(days_inclusive(start, natural_end));
        let monthly = |date: NaiveDate| self.rate_on(date).saturating_mul(units) / dec!(12);

        let points = self.change_points(start, end);
        if points.is_empty() && end == natural_end {
            return monthly(start);
        }

        let mut total = Decimal::ZERO;
        let mut seg_start = start;
        for point in points.into_iter().chain(end.succ_opt()) {
            let Some(seg_end) = point.pred_opt() else {
                continue;
            };
            if seg_end < seg_start {
                continue;
            }
            let days = Decimal::from(days_inclusive(seg_start, seg_end));
            total = total.saturating_add(monthly(seg_start).saturating_mul(days) / natural_days);
            seg_start = point;
        }
        total
    }
}
