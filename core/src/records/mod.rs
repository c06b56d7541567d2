//! In-memory records carried by capture sections.
//!
//! Records are exclusively owned by the section that contains them. Relations between kinds
//! (an event's `pid`, a handle's `pid`) are plain values, never references into other sections.

pub mod handle;
pub mod kevt;
pub mod pe;
pub mod process;

pub use handle::Handle;
pub use kevt::{KernelEvent, Param, ParamValue};
pub use pe::{PeMetadata, PeSection};
pub use process::ProcessSnapshot;

use serde::{Deserialize, Serialize};

use crate::section::SectionKind;

/// A batch of records of a single kind. One batch becomes one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Records {
    KernelEvents(Vec<KernelEvent>),
    Processes(Vec<ProcessSnapshot>),
    Handles(Vec<Handle>),
    PeMetadata(Vec<PeMetadata>),
}

impl Records {
    pub fn kind(&self) -> SectionKind {
        match self {
            Records::KernelEvents(_) => SectionKind::KernelEvent,
            Records::Processes(_) => SectionKind::Process,
            Records::Handles(_) => SectionKind::Handle,
            Records::PeMetadata(_) => SectionKind::Pe,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Records::KernelEvents(v) => v.len(),
            Records::Processes(v) => v.len(),
            Records::Handles(v) => v.len(),
            Records::PeMetadata(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An empty batch of the given kind.
    pub fn empty(kind: SectionKind) -> Self {
        match kind {
            SectionKind::KernelEvent => Records::KernelEvents(Vec::new()),
            SectionKind::Process => Records::Processes(Vec::new()),
            SectionKind::Handle => Records::Handles(Vec::new()),
            SectionKind::Pe => Records::PeMetadata(Vec::new()),
        }
    }

    pub fn into_kernel_events(self) -> Option<Vec<KernelEvent>> {
        match self {
            Records::KernelEvents(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_processes(self) -> Option<Vec<ProcessSnapshot>> {
        match self {
            Records::Processes(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_handles(self) -> Option<Vec<Handle>> {
        match self {
            Records::Handles(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_pe_metadata(self) -> Option<Vec<PeMetadata>> {
        match self {
            Records::PeMetadata(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Vec<KernelEvent>> for Records {
    fn from(v: Vec<KernelEvent>) -> Self {
        Records::KernelEvents(v)
    }
}

impl From<Vec<ProcessSnapshot>> for Records {
    fn from(v: Vec<ProcessSnapshot>) -> Self {
        Records::Processes(v)
    }
}

impl From<Vec<Handle>> for Records {
    fn from(v: Vec<Handle>) -> Self {
        Records::Handles(v)
    }
}

impl From<Vec<PeMetadata>> for Records {
    fn from(v: Vec<PeMetadata>) -> Self {
        Records::PeMetadata(v)
    }
}
