//! Date arithmetic for the schedule engine
//!
//! Every component that moves dates around takes a `&impl Calendar` instead of
//! calling chrono directly, so tests can pin behaviour to a known calendar and
//! the engine never reaches for an implicit clock.
//!
//! All arithmetic saturates at chrono's representable range rather than
//! failing: a document with an absurd term length degrades to a far-future
//! date, which the bounded generation loops then cut off.

use chrono::{Datelike, Days, Months, NaiveDate};

/// Days in a "casual" year when converting fractional years to days.
pub const DAYS_PER_CASUAL_YEAR: f64 = 365.0;

/// Date arithmetic used by the period calendar, term resolver and generators.
///
/// # Example
/// ```
/// use agreement_schedule_core_rs::core::{Calendar, GregorianCalendar};
/// use chrono::NaiveDate;
///
/// let cal = GregorianCalendar;
/// let start = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(cal.add_months(start, 1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// ```
pub trait Calendar {
    /// Add (or subtract, when negative) whole days.
    fn add_days(&self, date: NaiveDate, days: i64) -> NaiveDate;

    /// Add (or subtract) calendar months, clamping to the last day of the
    /// target month when the day does not exist there.
    fn add_months(&self, date: NaiveDate, months: i32) -> NaiveDate;

    /// Add (or subtract) calendar years.
    fn add_years(&self, date: NaiveDate, years: i32) -> NaiveDate {
        self.add_months(date, years.saturating_mul(12))
    }

    /// Add a possibly fractional number of years.
    ///
    /// Whole years are added on the calendar; the fractional remainder is
    /// converted at 365 days per year and rounded to the nearest whole day,
    /// with a half day rounding up.
    fn add_fractional_years(&self, date: NaiveDate, years: f64) -> NaiveDate {
        if !years.is_finite() {
            return date;
        }
        let whole = years.trunc();
        let whole_years = whole.clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        let shifted = self.add_years(date, whole_years);
        let residual_days = ((years - whole) * DAYS_PER_CASUAL_YEAR + 0.5).floor() as i64;
        self.add_days(shifted, residual_days)
    }

    /// Signed number of days from `from` to `to`.
    fn days_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        to.signed_duration_since(from).num_days()
    }

    /// Last day of the month containing `date`.
    fn end_of_month(&self, date: NaiveDate) -> NaiveDate {
        let first = date.with_day(1).unwrap_or(date);
        self.add_days(self.add_months(first, 1), -1)
    }

    /// ISO `YYYY-MM-DD` rendering.
    fn format(&self, date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}

/// Proleptic Gregorian calendar backed by chrono.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GregorianCalendar;

impl Calendar for GregorianCalendar {
    fn add_days(&self, date: NaiveDate, days: i64) -> NaiveDate {
        if days >= 0 {
            date.checked_add_days(Days::new(days as u64))
                .unwrap_or(NaiveDate::MAX)
        } else {
            date.checked_sub_days(Days::new(days.unsigned_abs()))
                .unwrap_or(NaiveDate::MIN)
        }
    }

    fn add_months(&self, date: NaiveDate, months: i32) -> NaiveDate {
        if months >= 0 {
            date.checked_add_months(Months::new(months as u32))
                .unwrap_or(NaiveDate::MAX)
        } else {
            date.checked_sub_months(Months::new(months.unsigned_abs()))
                .unwrap_or(NaiveDate::MIN)
        }
    }
}

/// Whole months from `from` to `to`, ignoring the day of month.
pub fn month_distance(from: NaiveDate, to: NaiveDate) -> i64 {
    (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
}
