//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. None of them ever escapes a
//! resolution cycle: the source selector turns them into "no data".

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// File missing, network failure or non-success HTTP status.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    /// Document reachable but failed schema validation.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Publish failed: {0}")]
    Publish(String),
}
