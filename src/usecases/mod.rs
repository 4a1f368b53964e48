//! Application use cases. Orchestrate domain logic via ports.

pub mod display_service;
pub mod refresh_loop;
pub mod source_selector;

pub use display_service::{DisplayService, resolve_display};
pub use refresh_loop::{RefreshLoop, ServiceFactory};
pub use source_selector::{Selected, SourceSelector};
