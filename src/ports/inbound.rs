//! Inbound port. The rendering collaborator reads the published result.

use crate::domain::DisplayResult;
use std::sync::Arc;

/// Read side of the single-slot display register.
pub trait DisplayFeed: Send + Sync {
    /// Most recently published result; `None` until the first cycle completes.
    fn latest(&self) -> Option<Arc<DisplayResult>>;
}
