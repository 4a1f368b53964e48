//! Core domain layer. No external I/O dependencies.
//!
//! Entities, compiled rules and the pure resolvers live here. Dependencies flow inward.

pub mod bell_schedule;
pub mod calendar;
pub mod display;
pub mod entities;
pub mod errors;
pub mod lessons;
pub mod rules;

pub use display::{
    DisplayResult, DisplayState, LessonGroup, PeriodStatus, ResolvedPeriod, SourceOrigins,
};
pub use entities::{
    BellSchedule, Calendar, CalendarEntry, DaySchedule, Dataset, DisplayOverride, Lesson,
    LessonSet, Origin, PeriodDefinition, PeriodKind, Snapshot, SourceDescriptor,
};
pub use errors::DomainError;
pub use rules::{DayCycle, DisplayRules, ResolutionRules, SpecialPeriodRule, YearGroupRules};
