//! tt-kiosk: School timetable kiosk core with Hexagonal Architecture.
//!
//! Resolves what a hallway display should show right now (day-type, current or
//! upcoming period, lessons by year group) from SIS exports, preferring fresh
//! primary feeds and falling back to legacy documents when they are stale.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
