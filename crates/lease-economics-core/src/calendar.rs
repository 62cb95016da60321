//! Calendar arithmetic shared by the normalizer and the schedule builders.
//!
//! All month arithmetic is anchored: period `k` is always computed as
//! `anchor + k months` rather than by stepping from the previous period, so
//! an anchor on the 31st lands on the last day of short months without
//! drifting for the rest of the lease.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

/// `date + months`, clamping the day to the end of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Whole months from `start` to `end`: the largest `k` such that
/// `add_months(start, k) <= end`. Negative when `end` precedes `start`.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return -months_between(end, start);
    }
    let raw = (end.year() - start.year()) as i64 * 12 + end.month() as i64 - start.month() as i64;
    let mut k = raw.max(0);
    while k > 0 {
        match add_months(start, k as u32) {
            Some(d) if d <= end => break,
            _ => k -= 1,
        }
    }
    k
}

/// Day count of the closed range `[start, end]`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Day count of the overlap between two closed ranges (0 when disjoint).
pub fn overlap_days(a: (NaiveDate, NaiveDate), b: (NaiveDate, NaiveDate)) -> i64 {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    if end < start {
        0
    } else {
        days_inclusive(start, end)
    }
}

/// True when `date` is the last calendar day of its month.
pub fn is_end_of_month(date: NaiveDate) -> bool {
    date.succ_opt().is_none_or(|next| next.month() != date.month())
}

/// Elapsed months from `epoch` to `date` as a decimal: whole calendar months
/// plus the elapsed share of the following month.
pub fn fractional_months(epoch: NaiveDate, date: NaiveDate) -> Decimal {
    if date < epoch {
        return -fractional_months(date, epoch);
    }
    let whole = months_between(epoch, date);
    let anchor = add_months(epoch, whole as u32).unwrap_or(date);
    let next = add_months(epoch, whole as u32 + 1).unwrap_or(anchor);
    let span = (next - anchor).num_days();
    let elapsed = (date - anchor).num_days();
    if span <= 0 || elapsed == 0 {
        Decimal::from(whole)
    } else {
        Decimal::from(whole) + Decimal::from(elapsed) / Decimal::from(span)
    }
}
