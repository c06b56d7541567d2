use byteorder::{ByteOrder, LittleEndian};

use crate::section::types::SectionHeader;

/// Encode a section header into canonical wire format.
///
/// Layout:
///
/// ```text
/// [ kind (2) ]
/// [ version (2) ]
/// [ length (4) ]
/// [ record_count (4) ]
/// ```
#[inline]
pub fn encode_section_header(h: &SectionHeader) -> [u8; SectionHeader::LEN] {
    let mut out = [0u8; SectionHeader::LEN];
    LittleEndian::write_u16(&mut out[0..2], h.kind_id);
    LittleEndian::write_u16(&mut out[2..4], h.version);
    LittleEndian::write_u32(&mut out[4..8], h.length);
    LittleEndian::write_u32(&mut out[8..12], h.record_count);
    out
}
