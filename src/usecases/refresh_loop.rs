//! Refresh loop use case: re-run the display cycle on a timer and publish each result.
//!
//! Three triggers: the refresh ticker (default every minute), an hourly
//! reinitialisation and a daily one at a fixed early-morning time. A
//! reinitialisation rebuilds the DisplayService from a fresh configuration read.
//! Cycles never overlap; each result is complete before it is published.

use crate::domain::DisplayResult;
use crate::ports::{Clock, DisplaySink};
use crate::usecases::display_service::DisplayService;
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at, sleep};
use tracing::{info, warn};

const HOUR: Duration = Duration::from_secs(3600);

/// Builds a service from the current configuration. Called at start and on every reinitialisation.
pub type ServiceFactory = Arc<dyn Fn() -> DisplayService + Send + Sync>;

/// Time from `now` to the next `at`. Exactly at `at` means a full day.
pub fn until_next_daily_reset(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let today = now.date().and_time(at);
    let next = if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    };
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

pub struct RefreshLoop {
    factory: ServiceFactory,
    sinks: Vec<Arc<dyn DisplaySink>>,
    /// Wall clock for scheduling the daily reset.
    clock: Arc<dyn Clock>,
    refresh: Duration,
    reinit_hourly: bool,
    daily_reset_at: Option<NaiveTime>,
}

impl RefreshLoop {
    pub fn new(
        factory: ServiceFactory,
        sinks: Vec<Arc<dyn DisplaySink>>,
        clock: Arc<dyn Clock>,
        refresh: Duration,
        reinit_hourly: bool,
        daily_reset_at: Option<NaiveTime>,
    ) -> Self {
        Self {
            factory,
            sinks,
            clock,
            refresh,
            reinit_hourly,
            daily_reset_at,
        }
    }

    /// One cycle with a freshly built service.
    pub async fn run_once(&self) -> DisplayResult {
        let service = (self.factory)();
        let result = service.run_cycle().await;
        self.publish(&result).await;
        result
    }

    /// Runs until `shutdown` completes. The first cycle runs immediately.
    pub async fn run_until<F: Future<Output = ()>>(&self, shutdown: F) {
        tokio::pin!(shutdown);
        let mut service = (self.factory)();

        let mut ticker = interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut hourly = interval_at(Instant::now() + HOUR, HOUR);
        hourly.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            refresh_secs = self.refresh.as_secs(),
            reinit_hourly = self.reinit_hourly,
            daily_reset_at = ?self.daily_reset_at,
            "refresh loop started"
        );

        loop {
            let daily_in = self
                .daily_reset_at
                .map(|at| until_next_daily_reset(self.clock.now(), at));

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested; refresh loop stopping");
                    break;
                }
                _ = sleep(daily_in.unwrap_or(Duration::MAX)), if daily_in.is_some() => {
                    info!("daily reinitialisation");
                    service = (self.factory)();
                }
                _ = hourly.tick(), if self.reinit_hourly => {
                    info!("hourly reinitialisation");
                    service = (self.factory)();
                }
                _ = ticker.tick() => {}
            }

            let result = service.run_cycle().await;
            self.publish(&result).await;
        }
    }

    async fn publish(&self, result: &DisplayResult) {
        for sink in &self.sinks {
            if let Err(e) = sink.publish(result).await {
                warn!(error = %e, "publish failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::publish::DisplaySlot;
    use crate::domain::{Dataset, DisplayState, DomainError, ResolutionRules};
    use crate::ports::DisplayFeed;
    use crate::usecases::SourceSelector;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 3)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn five() -> NaiveTime {
        NaiveTime::from_hms_opt(5, 0, 0).unwrap()
    }

    #[test]
    fn daily_reset_later_today() {
        assert_eq!(until_next_daily_reset(at(4, 30), five()), Duration::from_secs(30 * 60));
    }

    #[test]
    fn daily_reset_tomorrow() {
        assert_eq!(
            until_next_daily_reset(at(8, 0), five()),
            Duration::from_secs(21 * 3600)
        );
    }

    #[test]
    fn daily_reset_exactly_now_is_a_day_away() {
        assert_eq!(until_next_daily_reset(at(5, 0), five()), Duration::from_secs(24 * 3600));
    }

    struct Counting(AtomicUsize);

    #[async_trait]
    impl DisplaySink for Counting {
        async fn publish(&self, _result: &DisplayResult) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl DisplaySink for Failing {
        async fn publish(&self, _result: &DisplayResult) -> Result<(), DomainError> {
            Err(DomainError::Publish("disk full".into()))
        }
    }

    fn factory(builds: Arc<AtomicUsize>) -> ServiceFactory {
        Arc::new(move || {
            builds.fetch_add(1, Ordering::SeqCst);
            DisplayService::new(
                SourceSelector::new(Dataset::Calendar, 7, None, None, None),
                SourceSelector::new(Dataset::BellSchedule, 7, None, None, None),
                SourceSelector::new(Dataset::Lessons, 7, None, None, None),
                Arc::new(ResolutionRules::default()),
                Arc::new(FixedClock::new(at(8, 50))),
                false,
            )
        })
    }

    #[tokio::test]
    async fn run_once_publishes_to_every_sink() {
        let slot = Arc::new(DisplaySlot::new());
        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let sinks: Vec<Arc<dyn DisplaySink>> = vec![Arc::new(Failing), slot.clone(), counting.clone()];
        let refresh = RefreshLoop::new(
            factory(Arc::new(AtomicUsize::new(0))),
            sinks,
            Arc::new(FixedClock::new(at(8, 50))),
            Duration::from_secs(60),
            true,
            None,
        );
        let result = refresh.run_once().await;
        assert_eq!(result.state, DisplayState::NoData);
        assert_eq!(slot.latest().unwrap().as_ref(), &result);
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn loop_runs_first_cycle_then_stops() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let refresh = RefreshLoop::new(
            factory(builds.clone()),
            vec![counting.clone() as Arc<dyn DisplaySink>],
            Arc::new(FixedClock::new(at(8, 50))),
            Duration::from_secs(60),
            true,
            Some(five()),
        );
        refresh.run_until(sleep(Duration::from_millis(100))).await;
        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }
}
