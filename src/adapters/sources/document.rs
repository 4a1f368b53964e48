//! DatasetSource implementations: a fetched document, or built-in sample data.

use super::fetch::{Location, read_text};
use crate::domain::{DayCycle, DomainError, Snapshot};
use crate::ports::{Clock, DatasetSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use std::sync::Arc;

/// Turns document text into a validated dataset.
pub type Decoder<T> = fn(&str, &DayCycle) -> Result<Snapshot<T>, DomainError>;

/// Builds a sample dataset for the given date.
pub type Generator<T> = fn(NaiveDate, &DayCycle) -> Result<T, DomainError>;

/// A JSON or XML-RPC document at a path or URL. Re-read on every load.
pub struct DocumentSource<T> {
    location: Location,
    client: Client,
    cycle: DayCycle,
    decode: Decoder<T>,
}

impl<T> DocumentSource<T> {
    pub fn new(location: Location, client: Client, cycle: DayCycle, decode: Decoder<T>) -> Self {
        Self {
            location,
            client,
            cycle,
            decode,
        }
    }
}

#[async_trait]
impl<T: Send + 'static> DatasetSource<T> for DocumentSource<T> {
    fn describe(&self) -> String {
        self.location.to_string()
    }

    async fn load(&self) -> Result<Snapshot<T>, DomainError> {
        let text = read_text(&self.location, &self.client).await?;
        (self.decode)(&text, &self.cycle)
    }
}

/// Sample data stamped with the current time, so it is never stale.
pub struct SampleSource<T> {
    clock: Arc<dyn Clock>,
    cycle: DayCycle,
    generate: Generator<T>,
}

impl<T> SampleSource<T> {
    pub fn new(clock: Arc<dyn Clock>, cycle: DayCycle, generate: Generator<T>) -> Self {
        Self {
            clock,
            cycle,
            generate,
        }
    }
}

#[async_trait]
impl<T: Send + 'static> DatasetSource<T> for SampleSource<T> {
    fn describe(&self) -> String {
        "built-in sample".to_string()
    }

    async fn load(&self) -> Result<Snapshot<T>, DomainError> {
        let now = self.clock.now();
        let data = (self.generate)(now.date(), &self.cycle)?;
        Ok(Snapshot::new(data, Some(now)))
    }
}
