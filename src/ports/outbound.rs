//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DisplayResult, DomainError, Snapshot};
use chrono::NaiveDateTime;

/// One structured form of a dataset (primary JSON, legacy XML, built-in sample).
#[async_trait::async_trait]
pub trait DatasetSource<T>: Send + Sync {
    /// Human-readable location for logs.
    fn describe(&self) -> String;

    /// Fetch and decode the whole document. Any fetch or schema failure is an
    /// error; a partially decoded dataset is never returned.
    async fn load(&self) -> Result<Snapshot<T>, DomainError>;
}

/// Wall-clock source. Local kiosk time, no zone.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Receives every completed DisplayResult.
#[async_trait::async_trait]
pub trait DisplaySink: Send + Sync {
    async fn publish(&self, result: &DisplayResult) -> Result<(), DomainError>;
}
