//! Legacy XML-RPC fallback documents (`calendar.xml`, `bell_times.xml`, `timetable.xml`).
//!
//! The documents are flat arrays of `<struct>` records, so a handful of
//! patterns is enough; no general XML parsing.

use super::records::{
    BellTimeRow, CalendarRow, LessonRow, build_bell_schedule, build_calendar, build_lessons,
};
use crate::domain::{BellSchedule, Calendar, DayCycle, DomainError, LessonSet, Snapshot};
use regex::Regex;
use std::sync::LazyLock;

static STRUCT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<struct>(.*?)</struct>").unwrap());

static MEMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<member>\s*<name>(.*?)</name>\s*<value>(.*?)</value>\s*</member>").unwrap()
});

static TYPED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*<([A-Za-z0-9.]+)>(.*?)</[A-Za-z0-9.]+>\s*$").unwrap());

static EMPTY_TYPED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*<([A-Za-z0-9.]+)\s*/>\s*$").unwrap());

const DATETIME_TAG: &str = "dateTime.iso8601";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Member {
    name: String,
    /// Value type element, `None` for bare text.
    tag: Option<String>,
    text: String,
}

type Record = Vec<Member>;

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn parse_records(text: &str) -> Result<Vec<Record>, DomainError> {
    if text.contains("<fault>") {
        return Err(DomainError::Schema("XML-RPC fault response".into()));
    }
    if !text.contains("<methodResponse") && !text.contains("<struct>") {
        return Err(DomainError::Schema("not an XML-RPC document".into()));
    }
    let records: Vec<Record> = STRUCT_REGEX
        .captures_iter(text)
        .map(|s| {
            MEMBER_REGEX
                .captures_iter(&s[1])
                .map(|m| {
                    let raw = &m[2];
                    let (tag, text) = if let Some(t) = TYPED_REGEX.captures(raw) {
                        (Some(t[1].to_string()), unescape(t[2].trim()))
                    } else if let Some(t) = EMPTY_TYPED_REGEX.captures(raw) {
                        (Some(t[1].to_string()), String::new())
                    } else {
                        (None, unescape(raw.trim()))
                    };
                    Member {
                        name: m[1].trim().to_string(),
                        tag,
                        text,
                    }
                })
                .collect::<Record>()
        })
        .collect();
    Ok(records)
}

fn field<'a>(record: &'a Record, name: &str) -> Option<&'a str> {
    record
        .iter()
        .find(|m| m.name == name)
        .map(|m| m.text.as_str())
        .filter(|t| !t.is_empty())
}

fn required(record: &Record, name: &str) -> Result<String, DomainError> {
    field(record, name)
        .map(str::to_string)
        .ok_or_else(|| DomainError::Schema(format!("record without {}", name)))
}

fn day_number(record: &Record) -> Result<Option<u32>, DomainError> {
    field(record, "DayNumber")
        .map(|n| {
            n.parse()
                .map_err(|_| DomainError::Schema(format!("bad DayNumber {:?}", n)))
        })
        .transpose()
}

pub fn decode_bell_times(text: &str, cycle: &DayCycle) -> Result<Snapshot<BellSchedule>, DomainError> {
    let rows = parse_records(text)?
        .iter()
        .map(|r| {
            Ok(BellTimeRow {
                day_number: day_number(r)?,
                day_name: field(r, "DayName").map(str::to_string),
                period: required(r, "Period")?,
                start_time: required(r, "StartTime")?,
                end_time: required(r, "EndTime")?,
                kind: field(r, "Type").map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    Ok(Snapshot::new(build_bell_schedule(rows, cycle)?, None))
}

pub fn decode_calendar(text: &str, _cycle: &DayCycle) -> Result<Snapshot<Calendar>, DomainError> {
    let rows = parse_records(text)?
        .iter()
        .map(|r| {
            let date = r
                .iter()
                .find(|m| m.tag.as_deref() == Some(DATETIME_TAG))
                .map(|m| m.text.clone())
                .ok_or_else(|| DomainError::Schema("calendar record without a date".into()))?;
            // No explicit flag in the legacy form; records infer it from name and number.
            Ok(CalendarRow {
                date,
                day_name: field(r, "DayName").map(str::to_string),
                day_number: Some(day_number(r)?.unwrap_or(0)),
                is_school_day: None,
                cycle: None,
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    Ok(Snapshot::new(build_calendar(rows)?, None))
}

pub fn decode_lessons(text: &str, cycle: &DayCycle) -> Result<Snapshot<LessonSet>, DomainError> {
    let rows = parse_records(text)?
        .iter()
        .map(|r| {
            Ok(LessonRow {
                day_number: day_number(r)?,
                day_name: field(r, "DayName").map(str::to_string),
                period: required(r, "Period")?,
                class_code: required(r, "ClassCode")?,
                teacher_code: field(r, "TeacherCode").map(str::to_string),
                room_code: field(r, "RoomCode").map(str::to_string),
            })
        })
        .collect::<Result<Vec<_>, DomainError>>()?;
    Ok(Snapshot::new(build_lessons(rows, cycle)?, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wrap(structs: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><methodResponse><params><param><value><array><data>{}</data></array></value></param></params></methodResponse>",
            structs
        )
    }

    fn member(name: &str, value: &str) -> String {
        format!("<member><name>{}</name><value>{}</value></member>", name, value)
    }

    #[test]
    fn bell_times_with_typed_and_bare_values() {
        let doc = wrap(&format!(
            "<value><struct>{}{}{}{}{}</struct></value>",
            member("DayNumber", "<i4>6</i4>"),
            member("Period", "<string>P1</string>"),
            member("StartTime", "08:45"),
            member("EndTime", "<string>09:40</string>"),
            member("Type", "<string>T</string>"),
        ));
        let snap = decode_bell_times(&doc, &DayCycle::default()).unwrap();
        assert_eq!(snap.generated_at, None);
        let day = snap.data.day("MonB").unwrap();
        assert_eq!(day.periods()[0].code, "P1");
    }

    #[test]
    fn calendar_school_day_rule() {
        let doc = wrap(&format!(
            "<value><struct>{}{}{}</struct></value><value><struct>{}{}{}</struct></value>",
            member("Date", "<dateTime.iso8601>20250303T00:00:00</dateTime.iso8601>"),
            member("DayName", "<string>MonA</string>"),
            member("DayNumber", "<i4>1</i4>"),
            member("Date", "<dateTime.iso8601>20250308T00:00:00</dateTime.iso8601>"),
            member("DayName", "<string>Weekend</string>"),
            member("DayNumber", "<i4>0</i4>"),
        ));
        let cal = decode_calendar(&doc, &DayCycle::default()).unwrap().data;
        let mon = cal.get(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()).unwrap();
        assert!(mon.school_day);
        assert_eq!(mon.day_type, "MonA");
        let sat = cal.get(NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()).unwrap();
        assert!(!sat.school_day);
    }

    #[test]
    fn lessons_unescape_entities() {
        let doc = wrap(&format!(
            "<value><struct>{}{}{}{}{}</struct></value>",
            member("DayNumber", "<int>1</int>"),
            member("Period", "<string>P1</string>"),
            member("ClassCode", "<string>9MU1</string>"),
            member("TeacherCode", "<string>O&apos;BRIEN</string>"),
            member("RoomCode", "<string/>"),
        ));
        let lessons = decode_lessons(&doc, &DayCycle::default()).unwrap().data;
        let lesson = lessons.iter().next().unwrap();
        assert_eq!(lesson.teacher, "O'BRIEN");
        assert_eq!(lesson.room, "");
    }

    #[test]
    fn fault_response_is_rejected() {
        let doc = "<methodResponse><fault><value><struct>\
                   <member><name>faultCode</name><value><int>4</int></value></member>\
                   </struct></value></fault></methodResponse>";
        assert!(matches!(
            decode_lessons(doc, &DayCycle::default()),
            Err(DomainError::Schema(_))
        ));
    }

    #[test]
    fn missing_required_member_rejects_document() {
        let doc = wrap(&format!(
            "<value><struct>{}{}</struct></value>",
            member("DayNumber", "<i4>1</i4>"),
            member("Period", "<string>P1</string>"),
        ));
        assert!(decode_lessons(&doc, &DayCycle::default()).is_err());
    }

    #[test]
    fn non_xml_rejected() {
        assert!(decode_bell_times("{\"bell_times\": []}", &DayCycle::default()).is_err());
    }
}
