//! Section codecs.
//!
//! One codec per (kind, version) pair. A codec only ever decodes bytes written by the same
//! (kind, version); when a layout changes a new codec is added next to the old one and the
//! old one is left untouched, so older captures stay readable.
//!
//! Encoding is deterministic: equal records always produce identical bytes.

pub mod handle;
pub mod kevt;
pub mod pe;
pub mod process;
pub mod wire;

pub use handle::HandleCodecV1;
pub use kevt::{KevtCodecV1, KevtCodecV2};
pub use pe::PeCodecV1;
pub use process::ProcessCodecV1;
pub use wire::{WireError, WireReader, WireWriter};

use crate::records::Records;
use crate::section::{SectionHeader, SectionKind};
use crate::types::{CaptureError, Result};
use crate::version::SectionVersion;

/// Encode/decode pair for a single section layout.
pub trait SectionCodec: Send + Sync {
    fn kind(&self) -> SectionKind;
    fn version(&self) -> SectionVersion;

    /// Append the payload for `records` to `w`. `records` is guaranteed to be of `kind()`.
    fn encode_records(&self, records: &Records, w: &mut WireWriter) -> std::result::Result<(), WireError>;

    /// Decode exactly `count` records from `r`.
    fn decode_records(&self, r: &mut WireReader<'_>, count: usize) -> std::result::Result<Records, WireError>;

    /// Encode a batch into a section payload.
    fn encode(&self, records: &Records) -> Result<Vec<u8>> {
        if records.kind() != self.kind() {
            return Err(CaptureError::Encode {
                kind: self.kind(),
                reason: format!("{} records given to {} v{} codec", records.kind(), self.kind(), self.version()),
            });
        }
        let mut w = WireWriter::new();
        self.encode_records(records, &mut w).map_err(|e| CaptureError::Encode {
            kind: self.kind(),
            reason: e.to_string(),
        })?;
        Ok(w.into_inner())
    }

    /// Decode a section payload.
    ///
    /// `payload_offset` is the absolute file offset of the first payload byte; it is only used
    /// to report where malformed input was found. The header's (kind, version) is checked
    /// before a single payload byte is interpreted.
    fn decode(&self, header: &SectionHeader, payload: &[u8], payload_offset: u64) -> Result<Records> {
        let section_offset = payload_offset.saturating_sub(SectionHeader::LEN as u64);
        if header.kind_id != self.kind().id() {
            return Err(CaptureError::malformed(
                section_offset,
                format!(
                    "{} v{} codec asked to decode kind 0x{:04x}",
                    self.kind(),
                    self.version(),
                    header.kind_id
                ),
            ));
        }
        if header.version != self.version() {
            return Err(CaptureError::UnsupportedVersion {
                offset: section_offset,
                kind: self.kind(),
                version: header.version,
                max: self.version(),
            });
        }

        let mut r = WireReader::new(payload);
        let count = header.record_count as usize;
        if count > payload.len() {
            return Err(CaptureError::malformed(
                section_offset,
                format!("record count {} exceeds payload of {} bytes", count, payload.len()),
            ));
        }
        let records = self
            .decode_records(&mut r, count)
            .and_then(|records| r.finish().map(|_| records))
            .map_err(|e| CaptureError::malformed(payload_offset + e.position as u64, e.reason))?;
        Ok(records)
    }
}

/// Build the "wrong batch" error used by codec implementations.
pub(crate) fn kind_mismatch(expected: SectionKind, got: &Records) -> WireError {
    WireError::new(0, format!("expected {} records, got {}", expected, got.kind()))
}
