//! Period Calendar
//!
//! Computes where a payment period ends and what fraction of a full period it
//! covers.
//!
//! # Alignment
//!
//! - **Anniversary**: a period runs from its start to `start + 1 unit - 1 day`
//! - **ProRated**: a period runs to the natural calendar boundary (year,
//!   half, quarter or month end) containing its start, so a mid-period start
//!   produces a short first period and every later period is calendar-aligned
//!
//! Either way the end is clamped to the term end.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::calendar::Calendar;
use crate::core::frequency::Frequency;
use crate::core::growth::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodAlignment {
    Anniversary,
    ProRated,
}

impl PeriodAlignment {
    pub fn from_prorated(prorated_first_period: bool) -> Self {
        if prorated_first_period {
            PeriodAlignment::ProRated
        } else {
            PeriodAlignment::Anniversary
        }
    }
}

/// End of the period starting at `start`, clamped to `term_end`.
///
/// Returns `None` for an unrecognized frequency.
pub fn period_end<C: Calendar>(
    cal: &C,
    start: NaiveDate,
    frequency: &Frequency,
    alignment: PeriodAlignment,
    term_end: NaiveDate,
) -> Option<NaiveDate> {
    let end = match frequency {
        Frequency::Unrecognized(_) => return None,
        Frequency::OncePerTerm => term_end,
        _ => {
            let months = frequency.months()?;
            match alignment {
                PeriodAlignment::Anniversary => {
                    cal.add_days(cal.add_months(start, months as i32), -1)
                }
                PeriodAlignment::ProRated => natural_period(cal, start, months).1,
            }
        }
    };
    Some(end.min(term_end))
}

/// The calendar-aligned period of `months` length containing `date`, as
/// inclusive `(first_day, last_day)`.
pub fn natural_period<C: Calendar>(cal: &C, date: NaiveDate, months: u32) -> (NaiveDate, NaiveDate) {
    let months = months.clamp(1, 12);
    let first_month = ((date.month() - 1) / months) * months + 1;
    let first = NaiveDate::from_ymd_opt(date.year(), first_month, 1).unwrap_or(date);
    let last = cal.add_days(cal.add_months(first, months as i32), -1);
    (first, last)
}

/// Fraction of a full `frequency` period covered by `[start, end]` (inclusive).
///
/// Whole units are counted on the calendar from `start`; the remainder is
/// the share of days elapsed in the next unit. A once-per-term period is
/// always 1. Rounded to `decimals` places.
pub fn prorata_fraction<C: Calendar>(
    cal: &C,
    start: NaiveDate,
    end: NaiveDate,
    frequency: &Frequency,
    decimals: u32,
) -> f64 {
    let Some(months) = frequency.months() else {
        return 1.0;
    };
    if end < start {
        return 0.0;
    }
    let stop = cal.add_days(end, 1);
    let months = months as i32;

    let mut whole: i32 = 0;
    while cal.add_months(start, (whole + 1) * months) <= stop {
        whole += 1;
    }
    let unit_start = cal.add_months(start, whole * months);
    let unit_end = cal.add_months(start, (whole + 1) * months);
    let unit_days = cal.days_between(unit_start, unit_end).max(1) as f64;
    let residual = cal.days_between(unit_start, stop) as f64 / unit_days;

    round_to(whole as f64 + residual, decimals)
}
