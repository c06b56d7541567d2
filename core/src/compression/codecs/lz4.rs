//! codecs/lz4.rs
//! LZ4 block compressor/decompressor (deterministic, no levels).
use lz4_flex::block::{compress, decompress};

use crate::compression::registry::check_level;
use crate::compression::types::{open, seal, verify, CompressionCodec, CompressionError, Compressor, Decompressor};

/// Upper bound on lz4 block expansion: one input byte never yields more than 255 output bytes.
const MAX_EXPANSION: usize = 255;

pub struct Lz4Compressor;

pub struct Lz4Decompressor;

impl Lz4Compressor {
    pub fn new(level: i32) -> Result<Box<dyn Compressor + Send>, CompressionError> {
        check_level(CompressionCodec::Lz4, level)?;
        Ok(Box::new(Self))
    }
}

impl Compressor for Lz4Compressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let compressed = compress(input);
        seal("lz4", input, &compressed, out)
    }
}

impl Lz4Decompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for Lz4Decompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let (orig_len, compressed, expected_crc) = open("lz4", input)?;
        // decompress() allocates orig_len up front; refuse sizes the block cannot produce.
        let reachable = compressed.len().saturating_mul(MAX_EXPANSION).saturating_add(16);
        if orig_len > reachable {
            return Err(CompressionError::CodecProcessFailed {
                codec: "lz4".into(),
                msg: format!("declared size {} unreachable from a {} byte block", orig_len, compressed.len()),
            });
        }

        let decompressed = decompress(compressed, orig_len)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "lz4".into(), msg: e.to_string() })?;

        verify("lz4", orig_len, expected_crc, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
