//! Lesson matching: lessons of one (day-type, period), grouped by year label.

use super::display::LessonGroup;
use super::entities::{Lesson, LessonSet};
use super::rules::{SpecialPeriodRule, YearGroupRules};
use chrono::Weekday;

/// Groups the lessons of (`day_type`, `period`) for display.
///
/// Lessons whose year is outside the display set are dropped. Special-period
/// rules that apply to the slot pull their years into one combined group and
/// may hide others. Groups are ordered by their lowest year; lessons inside a
/// group keep source order. An empty result is valid.
pub fn match_lessons(
    day_type: &str,
    weekday: Weekday,
    period: &str,
    lessons: &LessonSet,
    years: &YearGroupRules,
    specials: &[SpecialPeriodRule],
) -> Vec<LessonGroup> {
    let active: Vec<&SpecialPeriodRule> = specials
        .iter()
        .filter(|r| r.applies(day_type, weekday, period))
        .collect();

    let mut groups: Vec<(u8, LessonGroup)> = Vec::new();
    for lesson in lessons
        .iter()
        .filter(|l| l.day_type == day_type && l.period == period)
    {
        let Some(year) = years.year_of(&lesson.class_code) else {
            continue;
        };
        if !years.displays(year) {
            continue;
        }

        let (label, rank, multi_row) = match active.iter().find(|r| r.years.contains(&year)) {
            Some(rule) => (
                rule.label.clone(),
                rule.years.first().copied().unwrap_or(year),
                rule.years.iter().any(|y| years.is_multi_row(*y)),
            ),
            None if active.iter().any(|r| r.hide.contains(&year)) => continue,
            None => (years.label(year), year, years.is_multi_row(year)),
        };
        push(&mut groups, label, rank, multi_row, lesson);
    }

    groups.sort_by_key(|(rank, _)| *rank);
    groups.into_iter().map(|(_, g)| g).collect()
}

fn push(groups: &mut Vec<(u8, LessonGroup)>, label: String, rank: u8, multi_row: bool, lesson: &Lesson) {
    match groups.iter_mut().find(|(_, g)| g.label == label) {
        Some((_, group)) => group.lessons.push(lesson.clone()),
        None => groups.push((
            rank,
            LessonGroup {
                label,
                multi_row,
                lessons: vec![lesson.clone()],
            },
        )),
    }
}
