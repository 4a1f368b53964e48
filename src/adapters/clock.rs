//! Clock implementations: wall clock, or a pinned instant for demos and tests.

use crate::ports::Clock;
use chrono::{Local, NaiveDateTime};

/// Kiosk-local wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant (`fixed_now` in configuration).
pub struct FixedClock {
    at: NaiveDateTime,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.at
    }
}
