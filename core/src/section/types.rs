use std::fmt;

use bytes::Bytes;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::constants::{END_OF_CAPTURE_KIND, END_OF_CAPTURE_VERSION};
use crate::version::SectionVersion;

/// Section kind identifiers. Ids are stable and never reused for a different meaning.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, Serialize, Deserialize)]
pub enum SectionKind {
    KernelEvent = 0x0001,
    Process     = 0x0002,
    Handle      = 0x0003,
    Pe          = 0x0004,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        SectionKind::KernelEvent,
        SectionKind::Process,
        SectionKind::Handle,
        SectionKind::Pe,
    ];

    #[inline(always)]
    pub const fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(id: u16) -> Option<Self> {
        SectionKind::try_from_primitive(id).ok()
    }

    pub const fn name(self) -> &'static str {
        match self {
            SectionKind::KernelEvent => "kevt",
            SectionKind::Process => "process",
            SectionKind::Handle => "handle",
            SectionKind::Pe => "pe",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Canonical section header (fixed size), written immediately before its payload.
///
/// `kind_id` stays raw so headers of kinds unknown to this build can still be framed and
/// skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionHeader {
    pub kind_id: u16,
    pub version: SectionVersion,
    /// Byte length of the stored payload that follows.
    pub length: u32,
    /// Number of logical records in the payload.
    pub record_count: u32,
}

impl SectionHeader {
    pub const LEN: usize = 2 // kind
        + 2                  // version
        + 4                  // length
        + 4;                 // record_count

    pub fn new(kind: SectionKind, version: SectionVersion, length: u32, record_count: u32) -> Self {
        Self {
            kind_id: kind.id(),
            version,
            length,
            record_count,
        }
    }

    /// End-of-capture marker. `section_count` is the number of sections written before it.
    pub fn end_marker(section_count: u32) -> Self {
        Self {
            kind_id: END_OF_CAPTURE_KIND,
            version: END_OF_CAPTURE_VERSION,
            length: 0,
            record_count: section_count,
        }
    }

    pub fn is_end_marker(&self) -> bool {
        self.kind_id == END_OF_CAPTURE_KIND
    }

    pub fn kind(&self) -> Option<SectionKind> {
        SectionKind::from_id(self.kind_id)
    }

    /// Produce a concise debug summary of the section header
    pub fn summary(&self) -> String {
        let kind = match self.kind() {
            Some(kind) => kind.name().to_string(),
            None if self.is_end_marker() => "end".to_string(),
            None => format!("0x{:04x}", self.kind_id),
        };
        format!(
            "SectionHeader {{ kind: {}, version: {}, length: {}, records: {} }}",
            kind, self.version, self.length, self.record_count,
        )
    }
}

/// A framed section exactly as stored: header plus (possibly compressed) payload bytes.
///
/// Used to pass through sections this build cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    pub header: SectionHeader,
    pub payload: Bytes,
}
