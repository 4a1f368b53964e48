//! Flat rows as they appear in the SIS exports, and their validated conversion
//! into domain datasets. Shared by the JSON and XML-RPC decoders.

use crate::domain::{
    BellSchedule, Calendar, CalendarEntry, DayCycle, DaySchedule, DomainError, Lesson,
    LessonSet, PeriodDefinition, PeriodKind,
};
use crate::shared::time::{parse_clock_time, parse_date};
use serde::Deserialize;

/// Day names the generators write for days without a timetable.
const NON_SCHOOL_NAMES: [&str; 3] = ["weekend", "holiday", "non-school"];

#[derive(Debug, Clone, Deserialize)]
pub struct BellTimeRow {
    #[serde(rename = "DayNumber", default)]
    pub day_number: Option<u32>,
    #[serde(rename = "DayName", default)]
    pub day_name: Option<String>,
    #[serde(rename = "Period")]
    pub period: String,
    #[serde(rename = "StartTime")]
    pub start_time: String,
    #[serde(rename = "EndTime")]
    pub end_time: String,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LessonRow {
    #[serde(rename = "DayNumber", default)]
    pub day_number: Option<u32>,
    #[serde(rename = "DayName", default)]
    pub day_name: Option<String>,
    #[serde(rename = "Period")]
    pub period: String,
    #[serde(rename = "ClassCode")]
    pub class_code: String,
    #[serde(rename = "TeacherCode", default)]
    pub teacher_code: Option<String>,
    #[serde(rename = "RoomCode", default)]
    pub room_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarRow {
    pub date: String,
    #[serde(default)]
    pub day_name: Option<String>,
    #[serde(default)]
    pub day_number: Option<u32>,
    #[serde(default)]
    pub is_school_day: Option<bool>,
    /// Number or numeric string in the exports.
    #[serde(default)]
    pub cycle: Option<serde_json::Value>,
}

/// Day-type from an explicit name, else from the day number through the cycle.
fn day_type(
    name: Option<&str>,
    number: Option<u32>,
    cycle: &DayCycle,
) -> Result<String, DomainError> {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return Ok(name.to_string());
    }
    let number =
        number.ok_or_else(|| DomainError::Schema("row has neither DayName nor DayNumber".into()))?;
    cycle
        .day_type(number)
        .map(str::to_string)
        .ok_or_else(|| DomainError::Schema(format!("day number {} is outside the day cycle", number)))
}

pub fn build_bell_schedule(rows: Vec<BellTimeRow>, cycle: &DayCycle) -> Result<BellSchedule, DomainError> {
    // Insertion-ordered grouping; DaySchedule::new sorts each day.
    let mut days: Vec<(String, Vec<PeriodDefinition>)> = Vec::new();
    for row in rows {
        let code = day_type(row.day_name.as_deref(), row.day_number, cycle)?;
        let start = parse_clock_time(&row.start_time).ok_or_else(|| {
            DomainError::Schema(format!("{} {}: bad StartTime {:?}", code, row.period, row.start_time))
        })?;
        let end = parse_clock_time(&row.end_time).ok_or_else(|| {
            DomainError::Schema(format!("{} {}: bad EndTime {:?}", code, row.period, row.end_time))
        })?;
        let kind = row
            .kind
            .as_deref()
            .map(PeriodKind::from_code)
            .unwrap_or(PeriodKind::Teaching);
        let period = PeriodDefinition::new(row.period.trim(), start, end, kind);
        match days.iter_mut().find(|(d, _)| *d == code) {
            Some((_, periods)) => periods.push(period),
            None => days.push((code, vec![period])),
        }
    }
    let days = days
        .into_iter()
        .map(|(code, periods)| DaySchedule::new(code, periods))
        .collect::<Result<Vec<_>, _>>()?;
    BellSchedule::from_days(days)
}

pub fn build_lessons(rows: Vec<LessonRow>, cycle: &DayCycle) -> Result<LessonSet, DomainError> {
    let lessons = rows
        .into_iter()
        .map(|row| {
            Ok(Lesson {
                day_type: day_type(row.day_name.as_deref(), row.day_number, cycle)?,
                period: row.period.trim().to_string(),
                class_code: row.class_code.trim().to_string(),
                teacher: row.teacher_code.unwrap_or_default().trim().to_string(),
                room: row.room_code.unwrap_or_default().trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    Ok(LessonSet::new(lessons))
}

pub fn build_calendar(rows: Vec<CalendarRow>) -> Result<Calendar, DomainError> {
    let entries = rows
        .into_iter()
        .map(|row| {
            let date = parse_date(&row.date)
                .ok_or_else(|| DomainError::Schema(format!("bad calendar date {:?}", row.date)))?;
            let name = row.day_name.unwrap_or_default().trim().to_string();
            let inferred = !name.is_empty()
                && row.day_number.is_none_or(|n| n > 0)
                && !NON_SCHOOL_NAMES.contains(&name.to_ascii_lowercase().as_str());
            Ok(CalendarEntry {
                date,
                day_type: name,
                school_day: row.is_school_day.unwrap_or(inferred),
                cycle: row.cycle.as_ref().and_then(cycle_number),
            })
        })
        .collect::<Result<Vec<CalendarEntry>, DomainError>>()?;
    if let Some(bad) = entries.iter().find(|e| e.school_day && e.day_type.is_empty()) {
        return Err(DomainError::Schema(format!("school day {} has no day-type", bad.date)));
    }
    Calendar::new(entries)
}

fn cycle_number(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
