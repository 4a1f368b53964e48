//! Display sinks: in-process slot and the `display.json` file.

pub mod display_json;
pub mod display_slot;

pub use display_json::DisplayJsonFile;
pub use display_slot::DisplaySlot;
