//! Source selection use case: pick primary, fallback, sample or nothing for one dataset.
//!
//! Never fails. Unavailable or stale sources are logged and passed over; if
//! nothing is usable the dataset is empty with origin `none` for this cycle.

use crate::domain::{Dataset, Origin};
use crate::ports::DatasetSource;
use chrono::{NaiveDateTime, TimeDelta};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The dataset chosen for one cycle and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Selected<T> {
    pub data: T,
    pub origin: Origin,
}

impl<T: Default> Selected<T> {
    pub fn missing() -> Self {
        Self {
            data: T::default(),
            origin: Origin::Missing,
        }
    }
}

/// Stale when the timestamp is missing or at least `threshold` old. Exactly at
/// the threshold counts as stale.
pub fn is_stale(generated_at: Option<NaiveDateTime>, now: NaiveDateTime, threshold: TimeDelta) -> bool {
    match generated_at {
        Some(at) => now - at >= threshold,
        None => true,
    }
}

pub struct SourceSelector<T> {
    dataset: Dataset,
    stale_after: TimeDelta,
    primary: Option<Arc<dyn DatasetSource<T>>>,
    fallback: Option<Arc<dyn DatasetSource<T>>>,
    sample: Option<Arc<dyn DatasetSource<T>>>,
}

impl<T: Default + Send + 'static> SourceSelector<T> {
    pub fn new(
        dataset: Dataset,
        stale_after_days: u32,
        primary: Option<Arc<dyn DatasetSource<T>>>,
        fallback: Option<Arc<dyn DatasetSource<T>>>,
        sample: Option<Arc<dyn DatasetSource<T>>>,
    ) -> Self {
        Self {
            dataset,
            stale_after: TimeDelta::days(i64::from(stale_after_days)),
            primary,
            fallback,
            sample,
        }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
    }

    /// Primary if loadable and fresh, else fallback if loadable (never
    /// staleness-checked), else sample if configured, else empty.
    pub async fn select(&self, now: NaiveDateTime) -> Selected<T> {
        let dataset = self.dataset;

        if let Some(primary) = &self.primary {
            match primary.load().await {
                Ok(snap) if !is_stale(snap.generated_at, now, self.stale_after) => {
                    debug!(%dataset, generated_at = ?snap.generated_at, "primary is fresh");
                    info!(%dataset, source = %primary.describe(), origin = %Origin::Primary, "dataset selected");
                    return Selected {
                        data: snap.data,
                        origin: Origin::Primary,
                    };
                }
                Ok(snap) => {
                    let age_days = snap.generated_at.map(|at| (now - at).num_days());
                    warn!(
                        %dataset,
                        source = %primary.describe(),
                        age_days = ?age_days,
                        threshold_days = self.stale_after.num_days(),
                        "primary is stale"
                    );
                }
                Err(e) => {
                    warn!(%dataset, source = %primary.describe(), error = %e, "primary unavailable");
                }
            }
        }

        if let Some(fallback) = &self.fallback {
            match fallback.load().await {
                Ok(snap) => {
                    info!(%dataset, source = %fallback.describe(), origin = %Origin::Fallback, "dataset selected");
                    return Selected {
                        data: snap.data,
                        origin: Origin::Fallback,
                    };
                }
                Err(e) => {
                    warn!(%dataset, source = %fallback.describe(), error = %e, "fallback unavailable");
                }
            }
        }

        if let Some(sample) = &self.sample {
            match sample.load().await {
                Ok(snap) => {
                    info!(%dataset, origin = %Origin::Sample, "dataset selected");
                    return Selected {
                        data: snap.data,
                        origin: Origin::Sample,
                    };
                }
                Err(e) => warn!(%dataset, error = %e, "sample data unavailable"),
            }
        }

        warn!(%dataset, "no usable source; dataset empty this cycle");
        Selected::missing()
    }
}
