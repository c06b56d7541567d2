//! Section framing.
//!
//! Responsibilities:
//! - Define section kinds and the fixed 12-byte section header
//! - Encode/decode section headers
//! - The end-of-capture marker written by `close()`
//!
//! Non-responsibilities:
//! - Payload layout (see `codec`)
//! - Compression
//! - IO

pub mod types;
pub mod encode;
pub mod decode;

pub use types::{RawSection, SectionHeader, SectionKind};
pub use encode::encode_section_header;
pub use decode::parse_section_header;
