//! kcap-core
//!
//! Versioned, self-describing capture file container.
//! Pure Rust, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod version;

// Framing
pub mod headers;
pub mod section;

// Records and their on-disk layouts
pub mod records;
pub mod codec;
pub mod registry;

pub mod compression;
pub mod telemetry;

// Capture files
pub mod io;
pub mod writer;
pub mod reader;
pub mod index;

pub use types::{CaptureError, ErrorKind, Result};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::CompressionCodec;
    pub use crate::headers::CaptureFileHeader;
    pub use crate::index::{CaptureIndex, IndexEntry};
    pub use crate::io::{InputSource, OutputSink};
    pub use crate::reader::{CaptureReader, ReaderOptions, ReaderState, Section, SkippedSection};
    pub use crate::records::{Handle, KernelEvent, Param, ParamValue, PeMetadata, PeSection, ProcessSnapshot, Records};
    pub use crate::registry::{RegistryBuilder, VersionRegistry};
    pub use crate::section::{RawSection, SectionHeader, SectionKind};
    pub use crate::telemetry::{CaptureCounters, CaptureSummary};
    pub use crate::types::{CaptureError, ErrorKind};
    pub use crate::writer::{CaptureWriter, WriterOptions, WrittenSection};
}
