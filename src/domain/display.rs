//! Cycle outputs: the resolved period and the final display result handed to
//! the rendering collaborator.

use super::entities::{Lesson, Origin, PeriodDefinition, PeriodKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodStatus {
    /// `now` falls inside the period.
    Current,
    /// Shown ahead of its start.
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPeriod {
    pub code: String,
    pub day_type: String,
    pub status: PeriodStatus,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub kind: PeriodKind,
}

impl ResolvedPeriod {
    pub fn from_definition(day_type: &str, period: &PeriodDefinition, status: PeriodStatus) -> Self {
        Self {
            code: period.code.clone(),
            day_type: day_type.to_string(),
            status,
            start: period.start,
            end: period.end,
            kind: period.kind,
        }
    }

    pub fn is_current(&self) -> bool {
        self.status == PeriodStatus::Current
    }
}

/// Lessons shown under one year label (or a combined special-period label).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonGroup {
    pub label: String,
    /// Presentation hint from the year-group configuration.
    pub multi_row: bool,
    pub lessons: Vec<Lesson>,
}

/// What the kiosk should show, or which "nothing to show" state applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    Showing,
    /// A period resolved but no displayed year has classes in it or any later period.
    NoClasses,
    /// School day, but nothing current or upcoming.
    NoPeriod,
    NotSchoolDay,
    /// A dataset needed to get this far had no usable source.
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOrigins {
    pub calendar: Origin,
    pub bell_schedule: Origin,
    pub lessons: Origin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayResult {
    /// Wall-clock instant the cycle resolved against.
    pub now: NaiveDateTime,
    /// Date whose timetable is shown (a later date when looking ahead).
    pub date: Option<NaiveDate>,
    pub day_type: Option<String>,
    pub period: Option<ResolvedPeriod>,
    pub groups: Vec<LessonGroup>,
    pub state: DisplayState,
    pub origins: SourceOrigins,
    /// Built-in configuration in use because the supplied one was unusable.
    pub config_degraded: bool,
}

impl DisplayResult {
    pub fn empty(now: NaiveDateTime, state: DisplayState, origins: SourceOrigins) -> Self {
        Self {
            now,
            date: None,
            day_type: None,
            period: None,
            groups: Vec::new(),
            state,
            origins,
            config_degraded: false,
        }
    }

    pub fn group(&self, label: &str) -> Option<&LessonGroup> {
        self.groups.iter().find(|g| g.label == label)
    }

    pub fn lesson_count(&self) -> usize {
        self.groups.iter().map(|g| g.lessons.len()).sum()
    }
}
