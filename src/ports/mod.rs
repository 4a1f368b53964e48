//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: the rendering side reads published results through these
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::DisplayFeed;
pub use outbound::{Clock, DatasetSource, DisplaySink};
