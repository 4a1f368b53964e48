//! Display use case: one full resolution cycle, from dataset selection to a finished DisplayResult.
//!
//! Selection is the only async step. Everything after it is `resolve_display`,
//! a pure function of the three selected datasets, the rules and `now`.

use crate::domain::bell_schedule::{periods_after, resolve_current_period, resolve_look_ahead};
use crate::domain::calendar::{next_school_day, resolve_day_type};
use crate::domain::lessons::match_lessons;
use crate::domain::{
    BellSchedule, Calendar, DisplayResult, DisplayState, LessonSet, Origin, PeriodStatus,
    ResolutionRules, ResolvedPeriod, SourceOrigins,
};
use crate::ports::Clock;
use crate::usecases::source_selector::{Selected, SourceSelector};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{debug, info};

pub struct DisplayService {
    calendar: SourceSelector<Calendar>,
    bells: SourceSelector<BellSchedule>,
    lessons: SourceSelector<LessonSet>,
    rules: Arc<ResolutionRules>,
    clock: Arc<dyn Clock>,
    config_degraded: bool,
}

impl DisplayService {
    pub fn new(
        calendar: SourceSelector<Calendar>,
        bells: SourceSelector<BellSchedule>,
        lessons: SourceSelector<LessonSet>,
        rules: Arc<ResolutionRules>,
        clock: Arc<dyn Clock>,
        config_degraded: bool,
    ) -> Self {
        Self {
            calendar,
            bells,
            lessons,
            rules,
            clock,
            config_degraded,
        }
    }

    /// Loads the datasets and resolves them. Never fails; missing data becomes a state.
    pub async fn run_cycle(&self) -> DisplayResult {
        let now = self.clock.now();
        let (calendar, bells, lessons) = tokio::join!(
            self.calendar.select(now),
            self.bells.select(now),
            self.lessons.select(now),
        );
        let result = resolve_display(
            now,
            &calendar,
            &bells,
            &lessons,
            &self.rules,
            self.config_degraded,
        );
        info!(
            now = %now,
            state = ?result.state,
            day_type = result.day_type.as_deref().unwrap_or("-"),
            period = result.period.as_ref().map(|p| p.code.as_str()).unwrap_or("-"),
            groups = result.groups.len(),
            lessons = result.lesson_count(),
            "cycle resolved"
        );
        result
    }
}

/// Resolves what to show at `now`.
///
/// Today's own schedule is tried first. If today is not a school day or has
/// nothing current or upcoming, the next school day within the look-ahead
/// horizon is checked with look-ahead rules (explicit overrides only). A
/// resolved period without lessons for any displayed year is skipped in favour
/// of the first later period that has some.
pub fn resolve_display(
    now: NaiveDateTime,
    calendar: &Selected<Calendar>,
    bells: &Selected<BellSchedule>,
    lessons: &Selected<LessonSet>,
    rules: &ResolutionRules,
    config_degraded: bool,
) -> DisplayResult {
    let origins = SourceOrigins {
        calendar: calendar.origin,
        bell_schedule: bells.origin,
        lessons: lessons.origin,
    };
    let today = now.date();
    let mut result = DisplayResult::empty(now, DisplayState::NoData, origins);
    result.config_degraded = config_degraded;

    if calendar.origin == Origin::Missing {
        return result;
    }
    result.date = Some(today);

    let today_type = resolve_day_type(today, &calendar.data);
    if let Some(day_type) = today_type {
        result.day_type = Some(day_type.to_string());
        if bells.origin == Origin::Missing {
            return result;
        }
        if let Some(period) = resolve_current_period(day_type, now, &bells.data, &rules.display) {
            return finish(result, today, period, bells, lessons, rules);
        }
    }

    if bells.origin != Origin::Missing {
        if let Some(next) = next_school_day(today, &calendar.data, rules.look_ahead_days) {
            if let Some(period) = resolve_look_ahead(&next.day_type, next.date, now, &bells.data, &rules.display) {
                debug!(date = %next.date, day_type = %next.day_type, period = %period.code, "looking ahead");
                result.day_type = Some(next.day_type.clone());
                return finish(result, next.date, period, bells, lessons, rules);
            }
        }
    }

    result.state = if today_type.is_some() {
        DisplayState::NoPeriod
    } else {
        DisplayState::NotSchoolDay
    };
    result
}

fn finish(
    mut result: DisplayResult,
    date: NaiveDate,
    period: ResolvedPeriod,
    bells: &Selected<BellSchedule>,
    lessons: &Selected<LessonSet>,
    rules: &ResolutionRules,
) -> DisplayResult {
    result.date = Some(date);
    let day_type = period.day_type.clone();
    result.day_type = Some(day_type.clone());

    if lessons.origin == Origin::Missing {
        result.period = Some(period);
        result.state = DisplayState::NoData;
        return result;
    }

    let weekday = date.weekday();
    let groups_for = |code: &str| {
        match_lessons(
            &day_type,
            weekday,
            code,
            &lessons.data,
            &rules.year_groups,
            &rules.special_periods,
        )
    };

    let groups = groups_for(&period.code);
    if !groups.is_empty() {
        result.groups = groups;
        result.period = Some(period);
        result.state = DisplayState::Showing;
        return result;
    }

    for later in periods_after(&day_type, &period.code, &bells.data) {
        let groups = groups_for(&later.code);
        if !groups.is_empty() {
            debug!(skipped = %period.code, showing = %later.code, "period has no lessons; advancing");
            result.groups = groups;
            result.period = Some(ResolvedPeriod::from_definition(
                &day_type,
                later,
                PeriodStatus::Upcoming,
            ));
            result.state = DisplayState::Showing;
            return result;
        }
    }

    result.period = Some(period);
    result.state = DisplayState::NoClasses;
    result
}
