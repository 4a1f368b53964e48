//! Cross-cutting helpers: configuration and time-string parsing.

pub mod config;
pub mod time;
