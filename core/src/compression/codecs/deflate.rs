//! Deflate (zlib wrapper) via flate2.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::compression::registry::check_level;
use crate::compression::types::{open, seal, verify, CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct DeflateCompressor {
    level: Compression,
}

pub struct DeflateDecompressor;

impl DeflateCompressor {
    pub fn new(level: i32) -> Result<Box<dyn Compressor + Send>, CompressionError> {
        check_level(CompressionCodec::Deflate, level)?;
        Ok(Box::new(Self { level: Compression::new(level as u32) }))
    }
}

impl Compressor for DeflateCompressor {
    fn compress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        // Each payload is its own zlib stream
        let mut enc = ZlibEncoder::new(Vec::new(), self.level);
        enc.write_all(input)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate".into(), msg: e.to_string() })?;
        let compressed = enc.finish()
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate".into(), msg: e.to_string() })?;
        seal("deflate", input, &compressed, out)
    }
}

impl DeflateDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for DeflateDecompressor {
    fn decompress_chunk(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let (orig_len, compressed, expected_crc) = open("deflate", input)?;

        // Never read past the declared size, a forged stream could inflate without bound.
        let mut decompressed = Vec::new();
        ZlibDecoder::new(compressed)
            .take(orig_len as u64 + 1)
            .read_to_end(&mut decompressed)
            .map_err(|e| CompressionError::CodecProcessFailed { codec: "deflate".into(), msg: e.to_string() })?;

        verify("deflate", orig_len, expected_crc, &decompressed)?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
