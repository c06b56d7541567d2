//! headers/encode.rs
//!
//! Serializes `CaptureFileHeader` into its fixed 15-byte little-endian layout.
//! Field order must match `decode.rs` exactly.

use byteorder::{ByteOrder, LittleEndian};

use crate::headers::types::{CaptureFileHeader, HEADER_LEN_V1};

#[inline]
pub fn encode_header_le(h: &CaptureFileHeader) -> [u8; HEADER_LEN_V1] {
    let mut out = [0u8; HEADER_LEN_V1];

    out[0..4].copy_from_slice(&h.magic);                         // 0..4   magic
    LittleEndian::write_u16(&mut out[4..6], h.format_version);  // 4..6   format version
    LittleEndian::write_u64(&mut out[6..14], h.created_at);     // 6..14  created_at (ns)
    out[14] = h.flags.bits();                                    // 14     flags

    out
}
