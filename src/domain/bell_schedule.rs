//! Bell schedule resolution: (day-type, wall-clock time) to the period to show.
//!
//! Pure and deterministic. Periods are kept sorted by start, so "first match"
//! is always the chronologically earliest candidate.

use super::display::{PeriodStatus, ResolvedPeriod};
use super::entities::{BellSchedule, PeriodDefinition};
use super::rules::DisplayRules;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// Period to show for `day_type` when the schedule belongs to `now`'s own date.
///
/// A period containing `now` wins. Otherwise the earliest period whose show
/// condition has opened is returned as upcoming:
/// - its default window, `show_ahead` before start;
/// - an override on `now`'s weekday whose `from` has passed;
/// - an override with `keep_until_start`, any time before start.
pub fn resolve_current_period(
    day_type: &str,
    now: NaiveDateTime,
    schedule: &BellSchedule,
    rules: &DisplayRules,
) -> Option<ResolvedPeriod> {
    let day = schedule.day(day_type)?;
    let time = now.time();

    if let Some(p) = day.periods().iter().find(|p| p.contains(time)) {
        return Some(ResolvedPeriod::from_definition(day_type, p, PeriodStatus::Current));
    }

    day.periods()
        .iter()
        .find(|p| shows_same_day(day_type, p, now, rules))
        .map(|p| ResolvedPeriod::from_definition(day_type, p, PeriodStatus::Upcoming))
}

/// Period to show for `day_type` when the schedule belongs to `date`, a later
/// date than `now` (e.g. Monday's first period on Friday afternoon). Only
/// explicit overrides can open:
/// - on `now`'s weekday once `from` has passed;
/// - with `keep_until_start`, from the last `weekday` at `from` on or before
///   `date` until the period starts, across the days in between.
pub fn resolve_look_ahead(
    day_type: &str,
    date: NaiveDate,
    now: NaiveDateTime,
    schedule: &BellSchedule,
    rules: &DisplayRules,
) -> Option<ResolvedPeriod> {
    let day = schedule.day(day_type)?;
    day.periods()
        .iter()
        .find(|p| {
            rules.override_for(day_type, p).is_some_and(|o| {
                if now >= date.and_time(p.start) {
                    return false;
                }
                if o.keep_until_start {
                    opens_before(date, o.weekday, o.from).is_some_and(|opens| now >= opens)
                } else {
                    o.weekday == now.weekday() && now.time() >= o.from
                }
            })
        })
        .map(|p| ResolvedPeriod::from_definition(day_type, p, PeriodStatus::Upcoming))
}

/// Periods after `period` in `day_type`, chronologically; the skip order for
/// periods without lessons.
pub fn periods_after<'a>(
    day_type: &str,
    period: &str,
    schedule: &'a BellSchedule,
) -> &'a [PeriodDefinition] {
    schedule
        .day(day_type)
        .map(|d| d.after(period))
        .unwrap_or(&[])
}

fn shows_same_day(
    day_type: &str,
    period: &PeriodDefinition,
    now: NaiveDateTime,
    rules: &DisplayRules,
) -> bool {
    let time = now.time();
    if time >= period.start {
        return false;
    }
    if window_open(period.start, time, rules) {
        return true;
    }
    rules.override_for(day_type, period).is_some_and(|o| {
        o.keep_until_start || (o.weekday == now.weekday() && o.from <= time)
    })
}

/// `from` on the last `weekday` on or before `date`.
fn opens_before(date: NaiveDate, weekday: Weekday, from: NaiveTime) -> Option<NaiveDateTime> {
    let back = (7 + date.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    let day = date.checked_sub_days(Days::new(u64::from(back)))?;
    Some(day.and_time(from))
}

/// `start - show_ahead <= time`, clamped at midnight.
fn window_open(start: NaiveTime, time: NaiveTime, rules: &DisplayRules) -> bool {
    let opens = i64::from(start.num_seconds_from_midnight()) - rules.show_ahead.num_seconds();
    i64::from(time.num_seconds_from_midnight()) >= opens.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::PeriodOverride;
    use crate::domain::{DaySchedule, DisplayOverride, PeriodKind};
    use chrono::TimeDelta;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// 2025-03-03 is a Monday.
    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn schedule() -> BellSchedule {
        let day = DaySchedule::new(
            "MonA",
            vec![
                PeriodDefinition::new("P1", t(8, 45), t(9, 40), PeriodKind::Teaching),
                PeriodDefinition::new("P2", t(9, 40), t(10, 35), PeriodKind::Teaching),
                PeriodDefinition::new("Recess", t(10, 35), t(10, 55), PeriodKind::Recess),
                PeriodDefinition::new("P3", t(10, 55), t(11, 50), PeriodKind::Teaching),
            ],
        )
        .unwrap();
        BellSchedule::from_days(vec![day]).unwrap()
    }

    fn friday_override(keep_until_start: bool) -> DisplayRules {
        DisplayRules {
            overrides: vec![PeriodOverride {
                day_type: "MonA".into(),
                period: "P1".into(),
                rule: DisplayOverride {
                    weekday: Weekday::Fri,
                    from: t(14, 30),
                    keep_until_start,
                },
            }],
            ..DisplayRules::default()
        }
    }

    #[test]
    fn current_period_inside_bounds() {
        let rules = DisplayRules::default();
        let p = resolve_current_period("MonA", at(3, 8, 50), &schedule(), &rules).unwrap();
        assert_eq!(p.code, "P1");
        assert!(p.is_current());
        assert_eq!(p.start, t(8, 45));
        assert_eq!(p.end, t(9, 40));
    }

    #[test]
    fn boundary_belongs_to_next_period() {
        let rules = DisplayRules::default();
        let p = resolve_current_period("MonA", at(3, 9, 40), &schedule(), &rules).unwrap();
        assert_eq!(p.code, "P2");
        assert!(p.is_current());
    }

    #[test]
    fn show_ahead_window_gives_upcoming() {
        let rules = DisplayRules::default();
        let p = resolve_current_period("MonA", at(3, 8, 36), &schedule(), &rules).unwrap();
        assert_eq!(p.code, "P1");
        assert_eq!(p.status, PeriodStatus::Upcoming);
    }

    #[test]
    fn before_every_window_is_none() {
        let rules = DisplayRules::default();
        assert!(resolve_current_period("MonA", at(3, 8, 34), &schedule(), &rules).is_none());
        assert!(resolve_current_period("MonA", at(3, 6, 0), &schedule(), &rules).is_none());
    }

    #[test]
    fn after_last_period_is_none() {
        let rules = DisplayRules::default();
        assert!(resolve_current_period("MonA", at(3, 12, 0), &schedule(), &rules).is_none());
    }

    #[test]
    fn unknown_day_type_is_none() {
        let rules = DisplayRules::default();
        assert!(resolve_current_period("TueB", at(3, 8, 50), &schedule(), &rules).is_none());
    }

    #[test]
    fn overlapping_windows_pick_earliest() {
        let rules = DisplayRules {
            show_ahead: TimeDelta::minutes(120),
            overrides: Vec::new(),
        };
        let p = resolve_current_period("MonA", at(3, 7, 30), &schedule(), &rules).unwrap();
        assert_eq!(p.code, "P1");
    }

    #[test]
    fn window_clamps_at_midnight() {
        let day = DaySchedule::new(
            "MonA",
            vec![PeriodDefinition::new("P0", t(0, 5), t(0, 30), PeriodKind::Other)],
        )
        .unwrap();
        let bells = BellSchedule::from_days(vec![day]).unwrap();
        let p = resolve_current_period("MonA", at(3, 0, 0), &bells, &DisplayRules::default());
        assert_eq!(p.unwrap().code, "P0");
    }

    #[test]
    fn look_ahead_override_opens_on_its_weekday() {
        let rules = friday_override(false);
        // 2025-02-28 is a Friday.
        let friday = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let before = friday.and_hms_opt(14, 29, 0).unwrap();
        let after = friday.and_hms_opt(14, 30, 0).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert!(resolve_look_ahead("MonA", monday, before, &schedule(), &rules).is_none());
        let p = resolve_look_ahead("MonA", monday, after, &schedule(), &rules).unwrap();
        assert_eq!(p.code, "P1");
        assert_eq!(p.status, PeriodStatus::Upcoming);
    }

    #[test]
    fn look_ahead_override_ignored_on_other_weekday() {
        let rules = friday_override(false);
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        assert!(resolve_look_ahead("MonA", monday, saturday, &schedule(), &rules).is_none());
    }

    #[test]
    fn keep_until_start_holds_across_the_weekend() {
        let rules = friday_override(true);
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let thursday = NaiveDate::from_ymd_opt(2025, 2, 27).unwrap();
        let friday = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();

        let shown = |now: NaiveDateTime| resolve_look_ahead("MonA", monday, now, &schedule(), &rules);
        assert!(shown(thursday.and_hms_opt(15, 0, 0).unwrap()).is_none());
        assert!(shown(friday.and_hms_opt(14, 29, 0).unwrap()).is_none());
        assert_eq!(shown(friday.and_hms_opt(14, 30, 0).unwrap()).unwrap().code, "P1");
        assert_eq!(shown(at(1, 10, 0)).unwrap().code, "P1");
        assert_eq!(shown(sunday.and_hms_opt(20, 0, 0).unwrap()).unwrap().code, "P1");
    }

    #[test]
    fn look_ahead_without_overrides_is_none() {
        let friday = NaiveDate::from_ymd_opt(2025, 2, 28)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert!(
            resolve_look_ahead("MonA", monday, friday, &schedule(), &DisplayRules::default())
                .is_none()
        );
    }

    #[test]
    fn keep_until_start_shows_early_on_own_day() {
        let early = at(3, 6, 0);
        assert!(resolve_current_period("MonA", early, &schedule(), &friday_override(false)).is_none());
        let p = resolve_current_period("MonA", early, &schedule(), &friday_override(true)).unwrap();
        assert_eq!(p.code, "P1");
        assert_eq!(p.status, PeriodStatus::Upcoming);
    }

    #[test]
    fn periods_after_in_order() {
        let sched = schedule();
        let after: Vec<_> = periods_after("MonA", "P2", &sched)
            .iter()
            .map(|p| p.code.as_str())
            .collect();
        assert_eq!(after, ["Recess", "P3"]);
        assert!(periods_after("MonB", "P2", &sched).is_empty());
    }
}
