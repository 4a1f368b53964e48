//! Domain entities. Pure data structures for the timetable core.
//!
//! No file formats here: adapters decode documents and build these through the
//! validating constructors, so a value that exists is always well-formed.

use super::errors::DomainError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The three logical datasets the kiosk reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Calendar,
    BellSchedule,
    Lessons,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dataset::Calendar => "calendar",
            Dataset::BellSchedule => "bell_schedule",
            Dataset::Lessons => "lessons",
        };
        f.write_str(name)
    }
}

/// Which source a dataset was taken from in the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Primary,
    Fallback,
    Sample,
    /// Nothing loaded; the dataset is empty for this cycle.
    #[serde(rename = "none")]
    Missing,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Origin::Primary => "primary",
            Origin::Fallback => "fallback",
            Origin::Sample => "sample",
            Origin::Missing => "none",
        };
        f.write_str(name)
    }
}

/// Where one dataset comes from and how old its primary form may get.
///
/// References are opaque strings here (path or URL); the sources adapter
/// resolves them. Rebuilt wholesale on every reinitialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub dataset: Dataset,
    /// `None` when the primary form is disabled.
    pub primary: Option<String>,
    /// `None` when fallback is disabled.
    pub fallback: Option<String>,
    pub stale_after_days: u32,
}

/// A decoded dataset together with the generation timestamp found in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    pub data: T,
    pub generated_at: Option<NaiveDateTime>,
}

impl<T> Snapshot<T> {
    pub fn new(data: T, generated_at: Option<NaiveDateTime>) -> Self {
        Self { data, generated_at }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Teaching,
    Orientation,
    Recess,
    Other,
}

impl PeriodKind {
    /// Maps the single-letter type codes used by the SIS exports (`T`, `O`, `R`).
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "T" | "TEACHING" => PeriodKind::Teaching,
            "O" | "ORIENTATION" => PeriodKind::Orientation,
            "R" | "RECESS" => PeriodKind::Recess,
            _ => PeriodKind::Other,
        }
    }
}

/// Makes a period visible ahead of its default show-ahead window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOverride {
    /// Day of week on which the period may start showing.
    pub weekday: Weekday,
    /// Time of day from which it shows on `weekday`.
    pub from: NaiveTime,
    /// Also show it on its own day from midnight until it starts.
    pub keep_until_start: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDefinition {
    pub code: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub kind: PeriodKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayOverride>,
}

impl PeriodDefinition {
    pub fn new(code: impl Into<String>, start: NaiveTime, end: NaiveTime, kind: PeriodKind) -> Self {
        Self {
            code: code.into(),
            start,
            end,
            kind,
            display: None,
        }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time < self.end
    }
}

/// Periods of one day-type, sorted by start time and non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    day_type: String,
    periods: Vec<PeriodDefinition>,
}

impl DaySchedule {
    /// Sorts `periods` chronologically and rejects empty, inverted, duplicate or
    /// overlapping periods.
    pub fn new(
        day_type: impl Into<String>,
        mut periods: Vec<PeriodDefinition>,
    ) -> Result<Self, DomainError> {
        let day_type = day_type.into();
        periods.sort_by_key(|p| p.start);
        for p in &periods {
            if p.end <= p.start {
                return Err(DomainError::Schema(format!(
                    "{} {}: end {} is not after start {}",
                    day_type, p.code, p.end, p.start
                )));
            }
        }
        for pair in periods.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(DomainError::Schema(format!(
                    "{}: {} overlaps {}",
                    day_type, pair[0].code, pair[1].code
                )));
            }
        }
        for (i, p) in periods.iter().enumerate() {
            if periods[..i].iter().any(|q| q.code == p.code) {
                return Err(DomainError::Schema(format!(
                    "{}: duplicate period {}",
                    day_type, p.code
                )));
            }
        }
        Ok(Self { day_type, periods })
    }

    pub fn day_type(&self) -> &str {
        &self.day_type
    }

    pub fn periods(&self) -> &[PeriodDefinition] {
        &self.periods
    }

    pub fn period(&self, code: &str) -> Option<&PeriodDefinition> {
        self.periods.iter().find(|p| p.code == code)
    }

    /// Periods starting after `code`, in chronological order. Empty if `code` is unknown.
    pub fn after(&self, code: &str) -> &[PeriodDefinition] {
        match self.periods.iter().position(|p| p.code == code) {
            Some(i) => &self.periods[i + 1..],
            None => &[],
        }
    }
}

/// All day schedules, keyed by day-type code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BellSchedule {
    days: BTreeMap<String, DaySchedule>,
}

impl BellSchedule {
    pub fn from_days(days: Vec<DaySchedule>) -> Result<Self, DomainError> {
        let mut map = BTreeMap::new();
        for day in days {
            let code = day.day_type.clone();
            if map.insert(code.clone(), day).is_some() {
                return Err(DomainError::Schema(format!("day-type {} defined twice", code)));
            }
        }
        Ok(Self { days: map })
    }

    pub fn day(&self, day_type: &str) -> Option<&DaySchedule> {
        self.days.get(day_type)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub day_type: String,
    pub school_day: bool,
    #[serde(default)]
    pub cycle: Option<u32>,
}

/// Date-indexed calendar. Dates without an entry are non-school days.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Calendar {
    entries: BTreeMap<NaiveDate, CalendarEntry>,
}

impl Calendar {
    /// Rejects a second entry for the same date.
    pub fn new(entries: Vec<CalendarEntry>) -> Result<Self, DomainError> {
        let mut map = BTreeMap::new();
        for entry in entries {
            let date = entry.date;
            if map.insert(date, entry).is_some() {
                return Err(DomainError::Schema(format!("duplicate calendar date {}", date)));
            }
        }
        Ok(Self { entries: map })
    }

    pub fn get(&self, date: NaiveDate) -> Option<&CalendarEntry> {
        self.entries.get(&date)
    }

    /// Entries strictly after `date`, in date order.
    pub fn entries_after(&self, date: NaiveDate) -> impl Iterator<Item = &CalendarEntry> {
        use std::ops::Bound;
        self.entries
            .range((Bound::Excluded(date), Bound::Unbounded))
            .map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub day_type: String,
    pub period: String,
    pub class_code: String,
    pub teacher: String,
    pub room: String,
}

/// Lessons in source order. Order is significant: groups preserve it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonSet {
    lessons: Vec<Lesson>,
}

impl LessonSet {
    pub fn new(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lesson> {
        self.lessons.iter()
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}
