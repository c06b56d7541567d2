//! headers/decode.rs
//!
//! Deserializes the fixed 15-byte header and validates it before anything else is read.
//! Magic is checked before the version, the version before the flags.

use byteorder::{ByteOrder, LittleEndian};

use crate::headers::types::{CaptureFileHeader, CaptureFlags, HEADER_LEN_V1};
use crate::types::{CaptureError, Result};

/// Decode and validate a header found at `offset` in the source.
#[inline]
pub fn decode_header_le(buf: &[u8], offset: u64) -> Result<CaptureFileHeader> {
    if buf.len() < HEADER_LEN_V1 {
        return Err(CaptureError::io(
            offset + buf.len() as u64,
            std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("capture header needs {} bytes, got {}", HEADER_LEN_V1, buf.len()),
            ),
        ));
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&buf[0..4]);

    let h = CaptureFileHeader {
        magic,
        format_version: LittleEndian::read_u16(&buf[4..6]),
        created_at: LittleEndian::read_u64(&buf[6..14]),
        // Reserved bits are kept so `validate` can report the raw value.
        flags: CaptureFlags::from_bits_retain(buf[14]),
    };

    h.validate(offset)?;
    Ok(h)
}
