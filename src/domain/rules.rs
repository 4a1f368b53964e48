//! Compiled resolution rules. Immutable for the lifetime of a service instance.
//!
//! Built from the configuration document by `shared::config`; `Default` is the
//! built-in configuration used when that document is unusable.

use super::entities::{DisplayOverride, PeriodDefinition};
use chrono::{TimeDelta, Weekday};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const DEFAULT_STALE_AFTER_DAYS: u32 = 7;
pub const DEFAULT_SHOW_AHEAD_MINUTES: u32 = 10;
pub const DEFAULT_LOOK_AHEAD_DAYS: u32 = 3;
pub const DEFAULT_CLASS_PATTERN: &str = r"\d+";
pub const DEFAULT_LABEL_FORMAT: &str = "Year {year}";

static DEFAULT_CLASS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_CLASS_PATTERN).unwrap());

/// Fortnightly cycle used by the SIS exports: day number = position + 1.
pub const DEFAULT_DAY_CYCLE: [&str; 10] = [
    "MonA", "TueA", "WedA", "ThuA", "FriA", "MonB", "TueB", "WedB", "ThuB", "FriB",
];

#[derive(Debug, Clone)]
pub struct ResolutionRules {
    pub stale_after_days: u32,
    pub display: DisplayRules,
    pub year_groups: YearGroupRules,
    pub special_periods: Vec<SpecialPeriodRule>,
    pub day_cycle: DayCycle,
    /// How many days ahead to search for the next school day when looking ahead. 0 disables.
    pub look_ahead_days: u32,
}

impl Default for ResolutionRules {
    fn default() -> Self {
        Self {
            stale_after_days: DEFAULT_STALE_AFTER_DAYS,
            display: DisplayRules::default(),
            year_groups: YearGroupRules::default(),
            special_periods: Vec::new(),
            day_cycle: DayCycle::default(),
            look_ahead_days: DEFAULT_LOOK_AHEAD_DAYS,
        }
    }
}

/// Override attached to one (day-type, period) by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodOverride {
    pub day_type: String,
    pub period: String,
    pub rule: DisplayOverride,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRules {
    pub show_ahead: TimeDelta,
    pub overrides: Vec<PeriodOverride>,
}

impl Default for DisplayRules {
    fn default() -> Self {
        Self {
            show_ahead: TimeDelta::minutes(i64::from(DEFAULT_SHOW_AHEAD_MINUTES)),
            overrides: Vec::new(),
        }
    }
}

impl DisplayRules {
    /// Configured override for the period, else the one carried by the definition itself.
    pub fn override_for<'a>(
        &'a self,
        day_type: &str,
        period: &'a PeriodDefinition,
    ) -> Option<&'a DisplayOverride> {
        self.overrides
            .iter()
            .find(|o| o.day_type == day_type && o.period == period.code)
            .map(|o| &o.rule)
            .or(period.display.as_ref())
    }
}

#[derive(Debug, Clone)]
pub struct YearGroupRules {
    pub display: BTreeSet<u8>,
    pub multi_row: BTreeSet<u8>,
    pub class_pattern: Regex,
    pub label_format: String,
}

impl Default for YearGroupRules {
    fn default() -> Self {
        Self {
            display: (7..=12).collect(),
            multi_row: BTreeSet::new(),
            class_pattern: DEFAULT_CLASS_REGEX.clone(),
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
        }
    }
}

impl YearGroupRules {
    /// Year level from a class code: first capture group if the pattern has one,
    /// otherwise the whole match.
    pub fn year_of(&self, class_code: &str) -> Option<u8> {
        let caps = self.class_pattern.captures(class_code)?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        m.as_str().parse().ok()
    }

    pub fn displays(&self, year: u8) -> bool {
        self.display.contains(&year)
    }

    pub fn is_multi_row(&self, year: u8) -> bool {
        self.multi_row.contains(&year)
    }

    pub fn label(&self, year: u8) -> String {
        self.label_format.replace("{year}", &year.to_string())
    }
}

/// Several year levels shown under one label for matching slots (e.g. sport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialPeriodRule {
    pub label: String,
    pub weekday: Option<Weekday>,
    pub day_types: Vec<String>,
    pub periods: Vec<String>,
    /// Merged under `label`; none of these get an individual group.
    pub years: BTreeSet<u8>,
    /// Not shown at all during the slot.
    pub hide: BTreeSet<u8>,
}

impl SpecialPeriodRule {
    pub fn applies(&self, day_type: &str, weekday: Weekday, period: &str) -> bool {
        self.periods.iter().any(|p| p == period)
            && (self.weekday == Some(weekday) || self.day_types.iter().any(|d| d == day_type))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCycle {
    codes: Vec<String>,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_CYCLE.iter().map(|s| s.to_string()).collect())
    }
}

impl DayCycle {
    pub fn new(codes: Vec<String>) -> Self {
        Self { codes }
    }

    /// Day-type code for a 1-based day number.
    pub fn day_type(&self, number: u32) -> Option<&str> {
        let idx = usize::try_from(number).ok()?.checked_sub(1)?;
        self.codes.get(idx).map(String::as_str)
    }

    pub fn number_of(&self, day_type: &str) -> Option<u32> {
        let idx = self.codes.iter().position(|c| c == day_type)?;
        u32::try_from(idx + 1).ok()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PeriodKind;
    use chrono::NaiveTime;

    #[test]
    fn year_of_uses_first_digit_run() {
        let rules = YearGroupRules::default();
        assert_eq!(rules.year_of("9MU1"), Some(9));
        assert_eq!(rules.year_of("12ENG2"), Some(12));
        assert_eq!(rules.year_of("ROLLCALL"), None);
    }

    #[test]
    fn year_of_prefers_capture_group() {
        let rules = YearGroupRules {
            class_pattern: Regex::new(r"^Y(\d+)").unwrap(),
            ..YearGroupRules::default()
        };
        assert_eq!(rules.year_of("Y10SCI3"), Some(10));
        assert_eq!(rules.year_of("10SCI3"), None);
    }

    #[test]
    fn default_class_pattern() {
        let a = YearGroupRules::default();
        let b = YearGroupRules::default();
        assert_eq!(a.class_pattern.as_str(), DEFAULT_CLASS_PATTERN);
        assert_eq!(b.year_of("7EN1"), Some(7));
    }

    #[test]
    fn label_format() {
        let rules = YearGroupRules::default();
        assert_eq!(rules.label(7), "Year 7");
    }

    #[test]
    fn day_cycle_numbers() {
        let cycle = DayCycle::default();
        assert_eq!(cycle.day_type(1), Some("MonA"));
        assert_eq!(cycle.day_type(10), Some("FriB"));
        assert_eq!(cycle.day_type(0), None);
        assert_eq!(cycle.day_type(11), None);
        assert_eq!(cycle.number_of("MonB"), Some(6));
    }

    #[test]
    fn configured_override_wins_over_definition() {
        let from = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
        let mut period = PeriodDefinition::new(
            "P1",
            NaiveTime::from_hms_opt(8, 45, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 40, 0).unwrap(),
            PeriodKind::Teaching,
        );
        period.display = Some(DisplayOverride {
            weekday: Weekday::Thu,
            from,
            keep_until_start: false,
        });
        let rules = DisplayRules {
            overrides: vec![PeriodOverride {
                day_type: "MonA".into(),
                period: "P1".into(),
                rule: DisplayOverride {
                    weekday: Weekday::Fri,
                    from,
                    keep_until_start: true,
                },
            }],
            ..DisplayRules::default()
        };
        assert_eq!(rules.override_for("MonA", &period).unwrap().weekday, Weekday::Fri);
        assert_eq!(rules.override_for("MonB", &period).unwrap().weekday, Weekday::Thu);
    }
}
