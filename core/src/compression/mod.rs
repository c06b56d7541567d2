//! compression/mod.rs
//! Optional compression of section payloads.
//!
//! Notes:
//! - Each section payload is compressed independently, so a damaged section never affects its
//!   neighbours and sections can be loaded by offset.
//! - Every codec emits the same envelope: `u32 original length | body | u32 crc32(original)`.
//! - Deterministic for a given codec and level.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;

pub use constants::*;
pub use types::*;
pub use registry::*;

use byteorder::{ByteOrder, LittleEndian};

/// Compress one section payload.
pub fn compress_payload(
    codec: CompressionCodec,
    level: Option<i32>,
    input: &[u8],
) -> Result<Vec<u8>, CompressionError> {
    if input.len() > MAX_PAYLOAD_SIZE {
        return Err(CompressionError::ChunkTooLarge { have: input.len(), max: MAX_PAYLOAD_SIZE });
    }
    let mut compressor = create_compressor(codec, level)?;
    let mut out = Vec::with_capacity(input.len() / 2 + ENVELOPE_OVERHEAD);
    compressor.compress_chunk(input, &mut out)?;
    Ok(out)
}

/// Decompress one section payload, refusing to inflate beyond `max_len` bytes.
///
/// Buffers grow with the bytes actually produced, so a forged length prefix costs nothing.
pub fn decompress_payload(
    codec: CompressionCodec,
    input: &[u8],
    max_len: usize,
) -> Result<Vec<u8>, CompressionError> {
    if input.len() < ENVELOPE_OVERHEAD {
        return Err(CompressionError::CodecProcessFailed {
            codec: codec.name().into(),
            msg: "input too short for length+checksum".into(),
        });
    }
    let orig_len = LittleEndian::read_u32(&input[0..4]) as usize;
    if orig_len > max_len {
        return Err(CompressionError::ChunkTooLarge { have: orig_len, max: max_len });
    }
    let mut decompressor = create_decompressor(codec)?;
    let mut out = Vec::new();
    decompressor.decompress_chunk(input, &mut out)?;
    Ok(out)
}
