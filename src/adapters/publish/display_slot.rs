//! Single-slot register holding the latest published result.
//!
//! Writers replace the whole value; readers clone an `Arc` and never observe a
//! partially built result.

use crate::domain::{DisplayResult, DomainError};
use crate::ports::{DisplayFeed, DisplaySink};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

pub struct DisplaySlot {
    tx: watch::Sender<Option<Arc<DisplayResult>>>,
}

impl Default for DisplaySlot {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySlot {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Receiver for consumers that want to await changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<DisplayResult>>> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl DisplaySink for DisplaySlot {
    async fn publish(&self, result: &DisplayResult) -> Result<(), DomainError> {
        self.tx.send_replace(Some(Arc::new(result.clone())));
        Ok(())
    }
}

impl DisplayFeed for DisplaySlot {
    fn latest(&self) -> Option<Arc<DisplayResult>> {
        self.tx.borrow().clone()
    }
}
