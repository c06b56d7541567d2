//! headers/types.rs
//! Capture file header struct and flag set.

use chrono::{DateTime, TimeZone, Utc};

use crate::compression::CompressionCodec;
use crate::constants::{flags, CAPTURE_FORMAT_CURRENT, MAGIC_KCAP};
use crate::types::{CaptureError, Result};
use crate::utils::fmt_bytes;

/// Fixed header size in bytes.
pub const HEADER_LEN_V1: usize = 4 // magic
    + 2                            // format_version
    + 8                            // created_at
    + 1;                           // flags

bitflags::bitflags! {
    /// Header flag byte. Bits 3..=7 are reserved; `from_bits` rejects them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CaptureFlags: u8 {
        /// Section payloads are compressed.
        const COMPRESSED = flags::COMPRESSED;
        /// Low bit of the compression codec id.
        const CODEC_BIT0 = 0b0000_0010;
        /// High bit of the compression codec id.
        const CODEC_BIT1 = 0b0000_0100;
    }
}

impl CaptureFlags {
    pub fn for_compression(codec: Option<CompressionCodec>) -> Self {
        match codec {
            None => CaptureFlags::empty(),
            Some(codec) => {
                let codec_bits = ((codec as u16 as u8) << flags::CODEC_SHIFT) & flags::CODEC_MASK;
                CaptureFlags::COMPRESSED | CaptureFlags::from_bits_retain(codec_bits)
            }
        }
    }

    /// Codec id carried in bits 1..=2, if any.
    pub fn codec_id(self) -> u8 {
        (self.bits() & flags::CODEC_MASK) >> flags::CODEC_SHIFT
    }

    /// Resolve the declared compression.
    ///
    /// The codec bits must be non-zero exactly when `COMPRESSED` is set.
    pub fn compression(self) -> Option<std::result::Result<CompressionCodec, u8>> {
        let id = self.codec_id();
        if !self.contains(CaptureFlags::COMPRESSED) {
            return if id == 0 { None } else { Some(Err(self.bits())) };
        }
        Some(CompressionCodec::try_from(u16::from(id)).map_err(|_| self.bits()))
    }
}

/// Capture file header.
///
/// Created once by the writer and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFileHeader {
    pub magic: [u8; 4],
    pub format_version: u16,
    /// Creation time, nanoseconds since the Unix epoch (UTC).
    pub created_at: u64,
    pub flags: CaptureFlags,
}

impl CaptureFileHeader {
    pub const LEN: usize = HEADER_LEN_V1;

    pub fn new(created_at: u64, compression: Option<CompressionCodec>) -> Self {
        Self {
            magic: MAGIC_KCAP,
            format_version: CAPTURE_FORMAT_CURRENT,
            created_at,
            flags: CaptureFlags::for_compression(compression),
        }
    }

    /// Canonical header for tests.
    pub fn test_header() -> Self {
        Self::new(1_600_000_000_000_000_000, None)
    }

    /// Header-level checks. `offset` is where the header starts in the source (always 0 for
    /// files, but kept explicit for embedded captures).
    pub fn validate(&self, offset: u64) -> Result<()> {
        if self.magic != MAGIC_KCAP {
            return Err(CaptureError::BadMagic { offset, found: self.magic });
        }
        if self.format_version == 0 || self.format_version > CAPTURE_FORMAT_CURRENT {
            return Err(CaptureError::UnsupportedFileVersion {
                offset: offset + 4,
                version: self.format_version,
                max: CAPTURE_FORMAT_CURRENT,
            });
        }
        if self.flags.bits() & flags::RESERVED_MASK != 0 {
            return Err(CaptureError::UnsupportedFlags { offset: offset + 14, flags: self.flags.bits() });
        }
        if let Some(Err(raw)) = self.flags.compression() {
            return Err(CaptureError::UnsupportedFlags { offset: offset + 14, flags: raw });
        }
        Ok(())
    }

    pub fn is_compressed(&self) -> bool {
        self.flags.contains(CaptureFlags::COMPRESSED)
    }

    /// Compression applied to section payloads. Only meaningful on a validated header.
    pub fn compression(&self) -> Option<CompressionCodec> {
        self.flags.compression().and_then(|c| c.ok())
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let nanos = i64::try_from(self.created_at).ok()?;
        Some(Utc.timestamp_nanos(nanos))
    }

    /// Produce a concise debug summary of the header
    pub fn summary(&self) -> String {
        let created = self
            .created_at_utc()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| self.created_at.to_string());
        format!(
            "CaptureFileHeader {{ magic: {}, version: {}, created_at: {}, flags: {:?} }}",
            fmt_bytes(&self.magic),
            self.format_version,
            created,
            self.flags,
        )
    }
}
