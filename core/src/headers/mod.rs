//! headers/mod.rs
//! Capture file header: the first 15 bytes of every capture.
//!
//! Notes:
//! - Fixed-size header, read and validated before any section is trusted.
//! - Magic and format version are checked first so foreign or future files fail fast.
//! - Flags declare whether section payloads are compressed and with which codec.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
