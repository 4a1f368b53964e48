//! Infrastructure adapters. Implement outbound ports.
//!
//! Dataset sources, clocks, display sinks, console UI. Map errors to DomainError.

pub mod clock;
pub mod publish;
pub mod sources;
pub mod ui;
