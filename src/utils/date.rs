//! Date helpers shared by the aggregators.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Age in whole years at a reference date, truncated (never rounded up).
///
/// Returns `None` when the reference date lies before the birth date.
#[must_use]
pub fn age_in_years(birth_date: NaiveDate, at: NaiveDate) -> Option<u16> {
    if at < birth_date {
        return None;
    }
    let mut years = at.year() - birth_date.year();
    // subtract one year if the birthday has not yet occurred in the reference year
    if (at.month(), at.day()) < (birth_date.month(), birth_date.day()) {
        years -= 1;
    }
    u16::try_from(years).ok()
}

/// Whole hours between two timestamps, rounded up to the next full hour.
#[must_use]
pub fn whole_hours(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let seconds = (end - start).num_seconds().max(0);
    // `seconds` is non-negative here; use the stable unsigned `div_ceil`.
    i64::try_from((seconds as u64).div_ceil(3600)).unwrap_or(i64::MAX)
}

/// The contiguous, ascending list of calendar days from `first` to `last`
/// inclusive. Empty if `last < first`.
#[must_use]
pub fn day_range(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = first;
    while day <= last {
        days.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}
