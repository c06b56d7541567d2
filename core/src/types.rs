use std::io;

use thiserror::Error;

use crate::compression::CompressionError;
use crate::constants::MAGIC_KCAP;
use crate::section::SectionKind;
use crate::utils::fmt_bytes;

pub type Result<T> = std::result::Result<T, CaptureError>;

/// Coarse classification of a [`CaptureError`], stable for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadMagic,
    UnsupportedFileVersion,
    UnsupportedFlags,
    UnknownKind,
    UnsupportedVersion,
    MalformedSection,
    Encode,
    InvalidConfig,
    Io,
    Compression,
}

/// Unified capture error.
///
/// Everything raised while reading carries the absolute byte offset at which it was detected,
/// so a partially corrupt capture can be diagnosed without re-reading it.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("bad magic at offset {offset}: expected {}, got {}", fmt_bytes(&MAGIC_KCAP), fmt_bytes(.found))]
    BadMagic { offset: u64, found: [u8; 4] },

    #[error("unsupported file format version {version} at offset {offset} (max supported {max})")]
    UnsupportedFileVersion { offset: u64, version: u16, max: u16 },

    #[error("unsupported header flags 0x{flags:02x} at offset {offset}")]
    UnsupportedFlags { offset: u64, flags: u8 },

    #[error("unknown section kind 0x{kind_id:04x} at offset {offset}")]
    UnknownKind { offset: u64, kind_id: u16 },

    #[error("unsupported {kind} section version {version} at offset {offset} (max supported {max})")]
    UnsupportedVersion {
        offset: u64,
        kind: SectionKind,
        version: u16,
        max: u16,
    },

    #[error("malformed section at offset {offset}: {reason}")]
    MalformedSection { offset: u64, reason: String },

    #[error("cannot encode {kind} section: {reason}")]
    Encode { kind: SectionKind, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error at offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("compression error: {0}")]
    Compression(#[from] CompressionError),
}

impl CaptureError {
    pub fn io(offset: u64, source: io::Error) -> Self {
        CaptureError::Io { offset, source }
    }

    pub fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        CaptureError::MalformedSection {
            offset,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::BadMagic { .. } => ErrorKind::BadMagic,
            CaptureError::UnsupportedFileVersion { .. } => ErrorKind::UnsupportedFileVersion,
            CaptureError::UnsupportedFlags { .. } => ErrorKind::UnsupportedFlags,
            CaptureError::UnknownKind { .. } => ErrorKind::UnknownKind,
            CaptureError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            CaptureError::MalformedSection { .. } => ErrorKind::MalformedSection,
            CaptureError::Encode { .. } => ErrorKind::Encode,
            CaptureError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            CaptureError::Io { .. } => ErrorKind::Io,
            CaptureError::Compression(_) => ErrorKind::Compression,
        }
    }

    /// Byte offset in the capture file, when the error is tied to one.
    pub fn offset(&self) -> Option<u64> {
        match self {
            CaptureError::BadMagic { offset, .. }
            | CaptureError::UnsupportedFileVersion { offset, .. }
            | CaptureError::UnsupportedFlags { offset, .. }
            | CaptureError::UnknownKind { offset, .. }
            | CaptureError::UnsupportedVersion { offset, .. }
            | CaptureError::MalformedSection { offset, .. }
            | CaptureError::Io { offset, .. } => Some(*offset),
            CaptureError::Encode { .. }
            | CaptureError::InvalidConfig(_)
            | CaptureError::Compression(_) => None,
        }
    }

    /// Section-level forward-compat gaps. Readers in non-strict mode skip these.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CaptureError::UnsupportedVersion { .. } | CaptureError::UnknownKind { .. }
        )
    }
}
