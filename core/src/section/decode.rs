use byteorder::{ByteOrder, LittleEndian};

use crate::section::types::SectionHeader;
use crate::types::{CaptureError, Result};

/// Parse a section header that starts at absolute `offset`.
///
/// Only framing is checked here; kind/version support is the registry's call.
#[inline]
pub fn parse_section_header(wire: &[u8], offset: u64) -> Result<SectionHeader> {
    if wire.len() < SectionHeader::LEN {
        return Err(CaptureError::malformed(
            offset,
            format!("truncated section header: {} of {} bytes", wire.len(), SectionHeader::LEN),
        ));
    }

    Ok(SectionHeader {
        kind_id: LittleEndian::read_u16(&wire[0..2]),
        version: LittleEndian::read_u16(&wire[2..4]),
        length: LittleEndian::read_u32(&wire[4..8]),
        record_count: LittleEndian::read_u32(&wire[8..12]),
    })
}
