//! Parsing of the time and date strings found in SIS exports and configuration.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// `HH:MM` or `HH:MM:SS` (hour may be a single digit).
pub fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .ok()
}

/// Generation timestamp as kiosk-local wall-clock time.
///
/// RFC 3339 values with an offset are converted to local time; naive ISO
/// values (what Python's `isoformat()` writes) are taken as local already.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// `YYYY-MM-DD`, or the compact XML-RPC form `YYYYMMDDTHH:MM:SS` (time ignored).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    let compact = s.split('T').next()?;
    NaiveDate::parse_from_str(compact, "%Y%m%d").ok()
}

/// `Mon`, `monday`, `FRI`...
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse().ok()
}
