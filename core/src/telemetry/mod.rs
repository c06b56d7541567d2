//! telemetry/mod.rs
//! Capture counters and the immutable summary returned by `CaptureWriter::close`.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
