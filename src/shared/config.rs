//! Application configuration. Source locations, refresh timing, resolution rules.
//!
//! One document (JSON or TOML, path in `TT_KIOSK_CONFIG`) overlaid by `TT_KIOSK_*`
//! environment variables. The `rules` section is compiled into immutable
//! [`ResolutionRules`]; when the document or the rules are unusable the
//! built-in defaults are used and the result is flagged degraded.

use crate::domain::rules::{
    DEFAULT_CLASS_PATTERN, DEFAULT_LABEL_FORMAT, DEFAULT_LOOK_AHEAD_DAYS,
    DEFAULT_SHOW_AHEAD_MINUTES, DEFAULT_STALE_AFTER_DAYS, PeriodOverride,
};
use crate::domain::{
    Dataset, DayCycle, DisplayOverride, DisplayRules, DomainError, ResolutionRules,
    SourceDescriptor, SpecialPeriodRule, YearGroupRules,
};
use crate::shared::time::{parse_clock_time, parse_timestamp, parse_weekday};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Seconds between refresh ticks when unset.
pub const DEFAULT_REFRESH_SECS: u64 = 60;
pub const DEFAULT_DAILY_RESET_AT: &str = "05:00";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    /// Base directory for relative source paths. Defaults to ".".
    pub data_dir: Option<String>,

    /// Where the published display.json is written. Relative to `data_dir`.
    pub output_path: Option<String>,

    /// Refresh tick in seconds (default 60). Read from TT_KIOSK_REFRESH_SECS.
    #[serde(default)]
    pub refresh_secs: Option<u64>,

    /// Rebuild the service every hour (default true).
    #[serde(default)]
    pub reinit_hourly: Option<bool>,

    /// Daily rebuild time, "HH:MM" (default 05:00). Empty string disables.
    #[serde(default)]
    pub daily_reset_at: Option<String>,

    /// Pin the clock to this local timestamp instead of the system time.
    #[serde(default)]
    pub fixed_now: Option<String>,

    /// Verbose source-selection logging.
    #[serde(default)]
    pub debug: bool,

    /// Use built-in sample data when both primary and fallback fail.
    #[serde(default)]
    pub use_sample_data: bool,

    /// Run a single cycle, publish, and exit.
    #[serde(default)]
    pub once: bool,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub rules: RulesConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct SourcesConfig {
    #[serde(default)]
    pub calendar: DatasetConfig,
    #[serde(default)]
    pub bell_times: DatasetConfig,
    #[serde(default)]
    pub lessons: DatasetConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct DatasetConfig {
    /// Generated JSON (path or URL).
    pub primary: Option<String>,
    /// Legacy XML (path or URL).
    pub fallback: Option<String>,
    /// false skips the primary form entirely.
    pub use_primary: Option<bool>,
    pub fallback_enabled: Option<bool>,
    /// Overrides `rules.stale_after_days` for this dataset.
    pub stale_after_days: Option<u32>,
}

impl DatasetConfig {
    fn descriptor(
        &self,
        dataset: Dataset,
        default_primary: &str,
        default_fallback: &str,
        stale_after_days: u32,
    ) -> SourceDescriptor {
        let primary = self
            .use_primary
            .unwrap_or(true)
            .then(|| self.primary.clone().unwrap_or_else(|| default_primary.to_string()));
        let fallback = self
            .fallback_enabled
            .unwrap_or(true)
            .then(|| self.fallback.clone().unwrap_or_else(|| default_fallback.to_string()));
        SourceDescriptor {
            dataset,
            primary,
            fallback,
            stale_after_days: self.stale_after_days.unwrap_or(stale_after_days),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RulesConfig {
    pub stale_after_days: Option<u32>,
    pub show_ahead_minutes: Option<u32>,
    pub look_ahead_days: Option<u32>,
    pub day_cycle: Option<Vec<String>>,
    #[serde(default)]
    pub display_overrides: Vec<OverrideConfig>,
    #[serde(default)]
    pub year_groups: YearGroupsConfig,
    #[serde(default)]
    pub special_periods: Vec<SpecialPeriodConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OverrideConfig {
    pub day_type: String,
    pub period: String,
    /// e.g. "Fri"
    pub weekday: String,
    /// "HH:MM"
    pub from: String,
    #[serde(default = "default_true")]
    pub keep_until_start: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct YearGroupsConfig {
    pub display: Option<Vec<u8>>,
    #[serde(default)]
    pub multi_row: Vec<u8>,
    pub class_pattern: Option<String>,
    pub label_format: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpecialPeriodConfig {
    pub label: String,
    pub weekday: Option<String>,
    #[serde(default)]
    pub day_types: Vec<String>,
    pub periods: Vec<String>,
    pub years: Vec<u8>,
    #[serde(default)]
    pub hide: Vec<u8>,
}

fn default_true() -> bool {
    true
}

impl RulesConfig {
    /// Validate and compile into immutable rules.
    pub fn compile(&self) -> Result<ResolutionRules, DomainError> {
        let show_ahead_minutes = self.show_ahead_minutes.unwrap_or(DEFAULT_SHOW_AHEAD_MINUTES);

        let overrides = self
            .display_overrides
            .iter()
            .map(|o| -> Result<PeriodOverride, DomainError> {
                Ok(PeriodOverride {
                    day_type: o.day_type.clone(),
                    period: o.period.clone(),
                    rule: DisplayOverride {
                        weekday: weekday(&o.weekday)?,
                        from: clock_time(&o.from)?,
                        keep_until_start: o.keep_until_start,
                    },
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let pattern = self
            .year_groups
            .class_pattern
            .as_deref()
            .unwrap_or(DEFAULT_CLASS_PATTERN);
        let class_pattern = Regex::new(pattern)
            .map_err(|e| DomainError::Config(format!("class_pattern {:?}: {}", pattern, e)))?;
        let label_format = self
            .year_groups
            .label_format
            .clone()
            .unwrap_or_else(|| DEFAULT_LABEL_FORMAT.to_string());
        if !label_format.contains("{year}") {
            return Err(DomainError::Config(format!(
                "label_format {:?} has no {{year}} placeholder",
                label_format
            )));
        }
        let year_groups = YearGroupRules {
            display: match &self.year_groups.display {
                Some(years) => years.iter().copied().collect(),
                None => (7..=12).collect(),
            },
            multi_row: self.year_groups.multi_row.iter().copied().collect(),
            class_pattern,
            label_format,
        };

        let special_periods = self
            .special_periods
            .iter()
            .map(|s| -> Result<SpecialPeriodRule, DomainError> {
                if s.weekday.is_none() && s.day_types.is_empty() {
                    return Err(DomainError::Config(format!(
                        "special period {:?} needs a weekday or day_types",
                        s.label
                    )));
                }
                Ok(SpecialPeriodRule {
                    label: s.label.clone(),
                    weekday: s.weekday.as_deref().map(weekday).transpose()?,
                    day_types: s.day_types.clone(),
                    periods: s.periods.clone(),
                    years: s.years.iter().copied().collect::<BTreeSet<u8>>(),
                    hide: s.hide.iter().copied().collect::<BTreeSet<u8>>(),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let day_cycle = match &self.day_cycle {
            Some(codes) if codes.is_empty() => {
                return Err(DomainError::Config("day_cycle is empty".into()));
            }
            Some(codes) => DayCycle::new(codes.clone()),
            None => DayCycle::default(),
        };

        Ok(ResolutionRules {
            stale_after_days: self.stale_after_days.unwrap_or(DEFAULT_STALE_AFTER_DAYS),
            display: DisplayRules {
                show_ahead: TimeDelta::minutes(i64::from(show_ahead_minutes)),
                overrides,
            },
            year_groups,
            special_periods,
            day_cycle,
            look_ahead_days: self.look_ahead_days.unwrap_or(DEFAULT_LOOK_AHEAD_DAYS),
        })
    }
}

fn weekday(s: &str) -> Result<chrono::Weekday, DomainError> {
    parse_weekday(s).ok_or_else(|| DomainError::Config(format!("invalid weekday {:?}", s)))
}

fn clock_time(s: &str) -> Result<NaiveTime, DomainError> {
    parse_clock_time(s).ok_or_else(|| DomainError::Config(format!("invalid time {:?}", s)))
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("TT_KIOSK_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        // TT_KIOSK_SOURCES__CALENDAR__PRIMARY -> sources.calendar.primary
        c = c.add_source(
            config::Environment::with_prefix("TT_KIOSK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );
        c.build()?.try_deserialize()
    }

    /// Returns the data directory. Defaults to ".".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| ".".to_string())
    }

    /// Returns the display.json output path. Defaults to "display.json".
    pub fn output_path_or_default(&self) -> String {
        self.output_path
            .clone()
            .unwrap_or_else(|| "display.json".to_string())
    }

    /// Returns the refresh tick in seconds. Defaults to 60; never below 1.
    pub fn refresh_secs_or_default(&self) -> u64 {
        self.refresh_secs.unwrap_or(DEFAULT_REFRESH_SECS).max(1)
    }

    pub fn reinit_hourly_or_default(&self) -> bool {
        self.reinit_hourly.unwrap_or(true)
    }

    /// Daily rebuild time. `None` when disabled with an empty string or unparsable.
    pub fn daily_reset_at(&self) -> Option<NaiveTime> {
        let raw = self.daily_reset_at.as_deref().unwrap_or(DEFAULT_DAILY_RESET_AT);
        if raw.trim().is_empty() {
            return None;
        }
        parse_clock_time(raw)
    }

    /// The pinned clock value, if one is configured and parses.
    pub fn fixed_now(&self) -> Option<NaiveDateTime> {
        self.fixed_now.as_deref().and_then(parse_timestamp)
    }

    /// One descriptor per dataset, with the file names the SIS generators write.
    pub fn descriptors(&self, rules: &ResolutionRules) -> [SourceDescriptor; 3] {
        let stale = rules.stale_after_days;
        [
            self.sources
                .calendar
                .descriptor(Dataset::Calendar, "calendar.json", "calendar.xml", stale),
            self.sources.bell_times.descriptor(
                Dataset::BellSchedule,
                "bell_times.json",
                "bell_times.xml",
                stale,
            ),
            self.sources
                .lessons
                .descriptor(Dataset::Lessons, "liss_info.json", "timetable.xml", stale),
        ]
    }
}

/// Configuration as used by one service instance.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app: AppConfig,
    pub rules: ResolutionRules,
    /// Built-in defaults replaced part of the supplied configuration.
    pub degraded: bool,
    /// Problems found while loading, for logging once tracing is up.
    pub issues: Vec<String>,
}

impl Settings {
    /// Load and compile. Never fails: unusable input degrades to defaults.
    pub fn load() -> Self {
        match AppConfig::load() {
            Ok(app) => Self::from_app(app),
            Err(e) => {
                let mut settings = Self::from_app(AppConfig::default());
                settings.degraded = true;
                settings.issues.push(format!("configuration unreadable: {}", e));
                settings
            }
        }
    }

    pub fn from_app(app: AppConfig) -> Self {
        let mut issues = Vec::new();
        let mut degraded = false;
        let rules = match app.rules.compile() {
            Ok(rules) => rules,
            Err(e) => {
                degraded = true;
                issues.push(format!("rules rejected, using built-in defaults: {}", e));
                ResolutionRules::default()
            }
        };
        if app.fixed_now.is_some() && app.fixed_now().is_none() {
            issues.push(format!(
                "fixed_now {:?} is not a timestamp; using the system clock",
                app.fixed_now.as_deref().unwrap_or_default()
            ));
        }
        Self {
            app,
            rules,
            degraded,
            issues,
        }
    }
}
