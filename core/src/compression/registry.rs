//! compression/registry.rs
//! Codec registry and factory functions.

use std::ops::RangeInclusive;

use crate::compression::codecs::{deflate, lz4, zstd};
use crate::compression::constants::{DEFAULT_LEVEL_DEFLATE, DEFAULT_LEVEL_LZ4, DEFAULT_LEVEL_ZSTD};
use crate::compression::types::{CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct CodecInfo {
    pub name: &'static str,
    pub default_level: i32,
}

pub fn resolve(codec_id: u16) -> Result<CodecInfo, CompressionError> {
    let codec = CompressionCodec::try_from(codec_id)
        .map_err(|_| CompressionError::UnsupportedCodec { codec_id })?;
    let default_level = match codec {
        CompressionCodec::Zstd => DEFAULT_LEVEL_ZSTD,
        CompressionCodec::Lz4 => DEFAULT_LEVEL_LZ4,
        CompressionCodec::Deflate => DEFAULT_LEVEL_DEFLATE,
    };
    Ok(CodecInfo { name: codec.name(), default_level })
}

/// Levels `codec` accepts. lz4 block mode has a single level.
pub fn level_range(codec: CompressionCodec) -> RangeInclusive<i32> {
    match codec {
        CompressionCodec::Zstd => ::zstd::compression_level_range(),
        CompressionCodec::Lz4 => DEFAULT_LEVEL_LZ4..=DEFAULT_LEVEL_LZ4,
        CompressionCodec::Deflate => 0..=9,
    }
}

pub fn check_level(codec: CompressionCodec, level: i32) -> Result<(), CompressionError> {
    let range = level_range(codec);
    if range.contains(&level) {
        return Ok(());
    }
    Err(CompressionError::CodecInitFailed {
        codec: codec.name().into(),
        msg: format!("level {} outside {}..={}", level, range.start(), range.end()),
    })
}

pub fn create_compressor(codec: CompressionCodec, level: Option<i32>)
    -> Result<Box<dyn Compressor + Send>, CompressionError>
{
    match codec {
        CompressionCodec::Zstd => zstd::ZstdCompressor::new(level.unwrap_or(DEFAULT_LEVEL_ZSTD)),
        CompressionCodec::Lz4 => lz4::Lz4Compressor::new(level.unwrap_or(DEFAULT_LEVEL_LZ4)),
        CompressionCodec::Deflate => deflate::DeflateCompressor::new(level.unwrap_or(DEFAULT_LEVEL_DEFLATE)),
    }
}

pub fn create_decompressor(codec: CompressionCodec)
    -> Result<Box<dyn Decompressor + Send>, CompressionError>
{
    match codec {
        CompressionCodec::Zstd => zstd::ZstdDecompressor::new(),
        CompressionCodec::Lz4 => lz4::Lz4Decompressor::new(),
        CompressionCodec::Deflate => deflate::DeflateDecompressor::new(),
    }
}
