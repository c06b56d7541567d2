//! compression/types.rs
//! Codec enum, errors and the compressor traits.
use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::compression::constants::codec_ids;
use crate::utils::{compute_checksum, enum_name_or_hex};

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum CompressionCodec {
    Zstd    = codec_ids::ZSTD,
    Lz4     = codec_ids::LZ4,
    Deflate = codec_ids::DEFLATE,
}

impl CompressionCodec {
    pub fn name(self) -> &'static str {
        match self {
            CompressionCodec::Zstd => "zstd",
            CompressionCodec::Lz4 => "lz4",
            CompressionCodec::Deflate => "deflate",
        }
    }
}

#[derive(Debug)]
pub enum CompressionError {
    UnsupportedCodec { codec_id: u16 },
    CodecInitFailed { codec: String, msg: String },
    CodecProcessFailed { codec: String, msg: String },
    ChunkTooLarge { have: usize, max: usize },
    ChecksumMismatch { codec: String, expected: u32, actual: u32 },
}

impl fmt::Display for CompressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CompressionError::*;
        match self {
            UnsupportedCodec { codec_id } =>
                write!(f, "unsupported compression codec: {}",
                       enum_name_or_hex::<CompressionCodec>(*codec_id)),
            CodecInitFailed { codec, msg } =>
                write!(f, "codec {} init failed: {}", codec, msg),
            CodecProcessFailed { codec, msg } =>
                write!(f, "codec {} process failed: {}", codec, msg),
            ChunkTooLarge { have, max } =>
                write!(f, "chunk too large: {} > {}", have, max),
            ChecksumMismatch { codec, expected, actual } =>
                write!(f, "codec {} checksum mismatch: expected {:08x}, got {:08x}", codec, expected, actual),
        }
    }
}

impl std::error::Error for CompressionError {}

// Require Send so trait objects can cross thread boundaries.
pub trait Compressor: Send {
    /// Compress one payload into `out` using the shared envelope.
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError>;
}

pub trait Decompressor: Send {
    /// Decompress one enveloped payload into `out`.
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError>;
}

/// Write `orig_len | body | crc32(original)`.
pub(crate) fn seal(codec: &str, original: &[u8], body: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
    let orig_len = u32::try_from(original.len()).map_err(|_| CompressionError::CodecProcessFailed {
        codec: codec.into(),
        msg: format!("payload of {} bytes exceeds u32", original.len()),
    })?;
    out.extend_from_slice(&orig_len.to_le_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(&compute_checksum(original).to_le_bytes());
    Ok(())
}

/// Split an envelope into (original length, body, expected crc32).
pub(crate) fn open<'a>(codec: &str, input: &'a [u8]) -> Result<(usize, &'a [u8], u32), CompressionError> {
    if input.len() < 8 {
        return Err(CompressionError::CodecProcessFailed {
            codec: codec.into(),
            msg: "input too short for length+checksum".into(),
        });
    }
    let orig_len = LittleEndian::read_u32(&input[0..4]) as usize;
    let body = &input[4..input.len() - 4];
    let expected_crc = LittleEndian::read_u32(&input[input.len() - 4..]);
    Ok((orig_len, body, expected_crc))
}

/// Check the decoded size and checksum against the envelope.
pub(crate) fn verify(codec: &str, orig_len: usize, expected_crc: u32, decoded: &[u8]) -> Result<(), CompressionError> {
    if decoded.len() != orig_len {
        return Err(CompressionError::CodecProcessFailed {
            codec: codec.into(),
            msg: format!("decoded size {} != prefix {}", decoded.len(), orig_len),
        });
    }
    let actual = compute_checksum(decoded);
    if actual != expected_crc {
        return Err(CompressionError::ChecksumMismatch {
            codec: codec.into(),
            expected: expected_crc,
            actual,
        });
    }
    Ok(())
}
