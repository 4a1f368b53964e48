//! Primary JSON documents written by the SIS generators.

use super::records::{
    BellTimeRow, CalendarRow, LessonRow, build_bell_schedule, build_calendar, build_lessons,
};
use crate::domain::{BellSchedule, Calendar, DayCycle, DomainError, LessonSet, Snapshot};
use crate::shared::time::parse_timestamp;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default, alias = "generated")]
    generated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BellTimesDoc {
    #[serde(default)]
    metadata: Metadata,
    bell_times: Vec<BellTimeRow>,
}

#[derive(Debug, Deserialize)]
struct CalendarDoc {
    #[serde(default)]
    metadata: Metadata,
    calendar: Vec<CalendarRow>,
}

#[derive(Debug, Deserialize)]
struct LessonsDoc {
    #[serde(default)]
    metadata: Metadata,
    timetable_data: Vec<LessonRow>,
}

fn parse<D: DeserializeOwned>(text: &str) -> Result<D, DomainError> {
    serde_json::from_str(text).map_err(|e| DomainError::Schema(format!("invalid JSON: {}", e)))
}

fn generated_at(meta: &Metadata) -> Option<NaiveDateTime> {
    meta.generated_at.as_deref().and_then(parse_timestamp)
}

pub fn decode_bell_times(text: &str, cycle: &DayCycle) -> Result<Snapshot<BellSchedule>, DomainError> {
    let doc: BellTimesDoc = parse(text)?;
    let at = generated_at(&doc.metadata);
    Ok(Snapshot::new(build_bell_schedule(doc.bell_times, cycle)?, at))
}

pub fn decode_calendar(text: &str, _cycle: &DayCycle) -> Result<Snapshot<Calendar>, DomainError> {
    let doc: CalendarDoc = parse(text)?;
    let at = generated_at(&doc.metadata);
    Ok(Snapshot::new(build_calendar(doc.calendar)?, at))
}

pub fn decode_lessons(text: &str, cycle: &DayCycle) -> Result<Snapshot<LessonSet>, DomainError> {
    let doc: LessonsDoc = parse(text)?;
    let at = generated_at(&doc.metadata);
    Ok(Snapshot::new(build_lessons(doc.timetable_data, cycle)?, at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const BELLS: &str = r#"{
        "metadata": { "generated_at": "2025-03-01T06:00:00" },
        "bell_times": [
            { "DayNumber": 1, "DayName": "MonA", "Period": "P1", "StartTime": "08:45", "EndTime": "09:40", "Type": "T" },
            { "DayNumber": 1, "DayName": "MonA", "Period": "R", "StartTime": "10:35", "EndTime": "10:55", "Type": "R" }
        ]
    }"#;

    #[test]
    fn bell_times_document() {
        let snap = decode_bell_times(BELLS, &DayCycle::default()).unwrap();
        assert_eq!(
            snap.generated_at,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(6, 0, 0)
        );
        assert_eq!(snap.data.day("MonA").unwrap().periods().len(), 2);
    }

    #[test]
    fn calendar_uses_generated_alias() {
        let text = r#"{
            "metadata": { "generated": "2025-03-01T06:00:00.123456" },
            "calendar": [ { "date": "2025-03-03", "day_name": "MonA", "day_number": 1, "is_school_day": true, "cycle": 1 } ]
        }"#;
        let snap = decode_calendar(text, &DayCycle::default()).unwrap();
        assert!(snap.generated_at.is_some());
        assert_eq!(snap.data.len(), 1);
    }

    #[test]
    fn missing_metadata_means_no_timestamp() {
        let text = r#"{ "timetable_data": [
            { "DayNumber": 1, "Period": "P1", "ClassCode": "9MU1", "TeacherCode": "SMITH", "RoomCode": "P5" }
        ] }"#;
        let snap = decode_lessons(text, &DayCycle::default()).unwrap();
        assert_eq!(snap.generated_at, None);
        assert_eq!(snap.data.iter().next().unwrap().day_type, "MonA");
    }

    #[test]
    fn unparsable_timestamp_means_no_timestamp() {
        let text = r#"{ "metadata": { "generated_at": "last tuesday" }, "timetable_data": [] }"#;
        assert_eq!(decode_lessons(text, &DayCycle::default()).unwrap().generated_at, None);
    }

    #[test]
    fn malformed_json_is_schema_error() {
        assert!(matches!(
            decode_bell_times("{ not json", &DayCycle::default()),
            Err(DomainError::Schema(_))
        ));
        assert!(decode_bell_times(r#"{ "metadata": {} }"#, &DayCycle::default()).is_err());
    }
}
