//! Calendar resolution: calendar date to day-type code.

use super::entities::{Calendar, CalendarEntry};
use chrono::NaiveDate;

/// Day-type recorded for exactly `date`. `None` for absent dates and for
/// entries flagged as non-school days; callers treat it as "nothing today".
pub fn resolve_day_type(date: NaiveDate, calendar: &Calendar) -> Option<&str> {
    calendar
        .get(date)
        .filter(|e| e.school_day)
        .map(|e| e.day_type.as_str())
}

/// First school day strictly after `date` and no more than `horizon_days` later.
pub fn next_school_day(
    date: NaiveDate,
    calendar: &Calendar,
    horizon_days: u32,
) -> Option<&CalendarEntry> {
    if horizon_days == 0 {
        return None;
    }
    let limit = date.checked_add_days(chrono::Days::new(u64::from(horizon_days)))?;
    calendar
        .entries_after(date)
        .take_while(|e| e.date <= limit)
        .find(|e| e.school_day)
}
