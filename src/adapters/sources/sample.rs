//! Built-in sample datasets, used when `use_sample_data` is on and both real
//! sources of a dataset are unavailable. Generated around the current date so a
//! fresh install shows something plausible.

use crate::domain::{
    BellSchedule, Calendar, CalendarEntry, DayCycle, DaySchedule, DomainError, Lesson, LessonSet,
    PeriodDefinition, PeriodKind,
};
use chrono::{Datelike, NaiveDate, NaiveTime, TimeDelta, Weekday};

const DAYS_BEFORE: i64 = 7;
const DAYS_AFTER: i64 = 28;

const PERIODS: [(&str, (u32, u32), (u32, u32), PeriodKind); 8] = [
    ("P1", (8, 45), (9, 40), PeriodKind::Teaching),
    ("P2", (9, 40), (10, 35), PeriodKind::Teaching),
    ("Recess", (10, 35), (10, 55), PeriodKind::Recess),
    ("P3", (10, 55), (11, 50), PeriodKind::Teaching),
    ("P4", (11, 50), (12, 45), PeriodKind::Teaching),
    ("Lunch", (12, 45), (13, 25), PeriodKind::Recess),
    ("P5", (13, 25), (14, 20), PeriodKind::Teaching),
    ("P6", (14, 20), (15, 15), PeriodKind::Teaching),
];

const SUBJECTS: [&str; 6] = ["EN", "MA", "SC", "HI", "MU", "PE"];
const TEACHERS: [&str; 6] = ["SMITH", "NGUYEN", "PATEL", "JONES", "BROWN", "TAYLOR"];

fn hm((h, m): (u32, u32)) -> Result<NaiveTime, DomainError> {
    NaiveTime::from_hms_opt(h, m, 0)
        .ok_or_else(|| DomainError::Schema(format!("bad sample time {:02}:{:02}", h, m)))
}

/// Week A on odd ISO weeks, week B on even ones.
fn day_type_for(date: NaiveDate, cycle: &DayCycle) -> Option<String> {
    let weekday = date.weekday();
    if matches!(weekday, Weekday::Sat | Weekday::Sun) {
        return None;
    }
    let base = weekday.number_from_monday();
    let week_b = date.iso_week().week() % 2 == 0;
    let code = if week_b { cycle.day_type(base + 5) } else { None };
    code.or_else(|| cycle.day_type(base)).map(str::to_string)
}

pub fn sample_calendar(today: NaiveDate, cycle: &DayCycle) -> Result<Calendar, DomainError> {
    let entries = (-DAYS_BEFORE..=DAYS_AFTER)
        .filter_map(|offset| today.checked_add_signed(TimeDelta::days(offset)))
        .map(|date| match day_type_for(date, cycle) {
            Some(day_type) => CalendarEntry {
                date,
                day_type,
                school_day: true,
                cycle: None,
            },
            None => CalendarEntry {
                date,
                day_type: "weekend".into(),
                school_day: false,
                cycle: None,
            },
        })
        .collect();
    Calendar::new(entries)
}

pub fn sample_bell_schedule(_today: NaiveDate, cycle: &DayCycle) -> Result<BellSchedule, DomainError> {
    let days = cycle
        .codes()
        .iter()
        .map(|code| {
            let periods = PERIODS
                .iter()
                .map(|(name, start, end, kind)| {
                    Ok(PeriodDefinition::new(*name, hm(*start)?, hm(*end)?, *kind))
                })
                .collect::<Result<Vec<_>, DomainError>>()?;
            DaySchedule::new(code.clone(), periods)
        })
        .collect::<Result<Vec<_>, _>>()?;
    BellSchedule::from_days(days)
}

pub fn sample_lessons(_today: NaiveDate, cycle: &DayCycle) -> Result<LessonSet, DomainError> {
    let mut lessons = Vec::new();
    for (d, code) in cycle.codes().iter().enumerate() {
        let teaching = PERIODS.iter().filter(|p| p.3 == PeriodKind::Teaching);
        for (p, (period, ..)) in teaching.enumerate() {
            for year in 7u8..=12 {
                let i = (d + p + usize::from(year)) % SUBJECTS.len();
                lessons.push(Lesson {
                    day_type: code.clone(),
                    period: (*period).to_string(),
                    class_code: format!("{}{}1", year, SUBJECTS[i]),
                    teacher: TEACHERS[i].to_string(),
                    room: format!("R{}{:02}", year, p + 1),
                });
            }
        }
    }
    Ok(LessonSet::new(lessons))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_covers_today_and_skips_weekends() {
        // 2025-03-03 is a Monday in ISO week 10 (even, week B).
        let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let cal = sample_calendar(today, &DayCycle::default()).unwrap();
        let entry = cal.get(today).unwrap();
        assert!(entry.school_day);
        assert_eq!(entry.day_type, "MonB");
        let sat = cal.get(NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()).unwrap();
        assert!(!sat.school_day);
    }

    #[test]
    fn short_cycle_falls_back_to_week_a() {
        let cycle = DayCycle::new(vec!["Mon".into(), "Tue".into(), "Wed".into(), "Thu".into(), "Fri".into()]);
        let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let cal = sample_calendar(today, &cycle).unwrap();
        assert_eq!(cal.get(today).unwrap().day_type, "Mon");
    }

    #[test]
    fn bells_and_lessons_cover_every_day_type() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let cycle = DayCycle::default();
        let bells = sample_bell_schedule(today, &cycle).unwrap();
        assert_eq!(bells.len(), 10);
        assert_eq!(bells.day("FriB").unwrap().periods().len(), 8);
        let lessons = sample_lessons(today, &cycle).unwrap();
        assert_eq!(lessons.len(), 10 * 6 * 6);
    }
}
