//! codecs/zstd.rs
//!
//! Zstd block compressor/decompressor.
//!
//! Every payload is a standalone frame, so any section can be decompressed without its
//! neighbours.

use std::io::Read;

use crate::compression::registry::check_level;
use crate::compression::types::{open, seal, verify, CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct ZstdCompressor {
    level: i32,
}

pub struct ZstdDecompressor;

impl ZstdCompressor {
    pub fn new(level: i32) -> Result<Box<dyn Compressor + Send>, CompressionError> {
        check_level(CompressionCodec::Zstd, level)?;
        Ok(Box::new(Self { level }))
    }
}

impl Compressor for ZstdCompressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = zstd::bulk::compress(input, self.level)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "zstd".into(), msg: e.to_string() })?;
        seal("zstd", input, &compressed, out)
    }
}

impl ZstdDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for ZstdDecompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let (orig_len, compressed, expected_crc) = open("zstd", input)?;

        // Streamed so the buffer grows with the frame's real output, not the declared size.
        let decoder = zstd::stream::read::Decoder::with_buffer(compressed)
            .map_err(|e| CompressionError::CodecInitFailed { codec: "zstd".into(), msg: e.to_string() })?;
        let mut decompressed = Vec::new();
        decoder
            .take(orig_len as u64 + 1)
            .read_to_end(&mut decompressed)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "zstd".into(), msg: e.to_string() })?;

        verify("zstd", orig_len, expected_crc, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
