// Compression suite: codec envelopes, corruption detection, and compressed captures.

mod common;

#[cfg(test)]
mod tests {
    use kcap_core::compression::{
        compress_payload, decompress_payload, level_range, resolve, CompressionCodec, CompressionError, ENVELOPE_OVERHEAD,
    };
    use kcap_core::prelude::*;

    use crate::common::{compressed_options, mixed_batches, read_all, write_capture};

    const ALL: [CompressionCodec; 3] = [CompressionCodec::Zstd, CompressionCodec::Lz4, CompressionCodec::Deflate];

    fn sample() -> Vec<u8> {
        b"CreateFile C:\\Windows\\System32\\ntdll.dll ".repeat(64)
    }

    #[test]
    fn payload_round_trips_for_every_codec() {
        let input = sample();
        for codec in ALL {
            let packed = compress_payload(codec, None, &input).unwrap();
            assert!(packed.len() < input.len(), "{} did not shrink repetitive input", codec.name());
            assert_eq!(&packed[..4], &(input.len() as u32).to_le_bytes());
            assert_eq!(decompress_payload(codec, &packed, input.len()).unwrap(), input);
        }
    }

    #[test]
    fn empty_payload_round_trips() {
        for codec in ALL {
            let packed = compress_payload(codec, None, &[]).unwrap();
            assert!(packed.len() >= ENVELOPE_OVERHEAD);
            assert!(decompress_payload(codec, &packed, 0).unwrap().is_empty());
        }
    }

    #[test]
    fn compression_is_deterministic() {
        let input = sample();
        for codec in ALL {
            let level = Some(*level_range(codec).end().min(&3));
            assert_eq!(
                compress_payload(codec, level, &input).unwrap(),
                compress_payload(codec, level, &input).unwrap()
            );
        }
    }

    #[test]
    fn flipped_checksum_is_detected() {
        let input = sample();
        for codec in ALL {
            let mut packed = compress_payload(codec, None, &input).unwrap();
            let last = packed.len() - 1;
            packed[last] ^= 0xFF;
            let err = decompress_payload(codec, &packed, input.len()).unwrap_err();
            assert!(matches!(err, CompressionError::ChecksumMismatch { .. }), "{}: {}", codec.name(), err);
        }
    }

    #[test]
    fn declared_size_above_limit_is_refused() {
        let input = sample();
        for codec in ALL {
            let packed = compress_payload(codec, None, &input).unwrap();
            let err = decompress_payload(codec, &packed, input.len() - 1).unwrap_err();
            assert!(matches!(err, CompressionError::ChunkTooLarge { .. }), "{}", err);
        }
    }

    #[test]
    fn short_envelope_is_refused() {
        for codec in ALL {
            assert!(decompress_payload(codec, &[1, 2, 3], 1024).is_err());
        }
    }

    #[test]
    fn inflated_size_prefix_is_refused_without_trusting_it() {
        let input = sample();
        let forged_len = 200u32 << 20;
        for codec in ALL {
            let mut packed = compress_payload(codec, None, &input).unwrap();
            packed[..4].copy_from_slice(&forged_len.to_le_bytes());
            let err = decompress_payload(codec, &packed, 256 << 20).unwrap_err();
            assert!(matches!(err, CompressionError::CodecProcessFailed { .. }), "{}: {}", codec.name(), err);
        }
    }

    #[test]
    fn invalid_level_fails_writer_creation_for_every_codec() {
        for codec in ALL {
            let level = level_range(codec).end() + 1;
            let opts = WriterOptions { compression_level: Some(level), ..compressed_options(codec) };
            let err = CaptureWriter::new(Vec::new(), VersionRegistry::shared(), opts).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig, "{}", codec.name());
        }
    }

    #[test]
    fn compressors_reject_levels_directly() {
        for codec in ALL {
            let level = level_range(codec).start() - 1;
            assert!(compress_payload(codec, Some(level), b"x").is_err(), "{}", codec.name());
        }
    }

    #[test]
    fn resolve_knows_every_codec_id() {
        for codec in ALL {
            assert_eq!(resolve(codec as u16).unwrap().name, codec.name());
        }
        assert!(matches!(resolve(9), Err(CompressionError::UnsupportedCodec { codec_id: 9 })));
    }

    #[test]
    fn compressed_captures_round_trip() {
        let batches = mixed_batches();
        for codec in ALL {
            let (bytes, summary) = write_capture(&batches, compressed_options(codec));
            assert_eq!(summary.compression, Some(codec));
            assert_eq!(read_all(&bytes, ReaderOptions::strict()), batches, "{}", codec.name());
            assert!(summary.counters.bytes_payload > 0);

            let reader = CaptureReader::new(&bytes[..], VersionRegistry::shared(), ReaderOptions::default()).unwrap();
            assert_eq!(reader.file_header().compression(), Some(codec));
        }
    }

    #[test]
    fn corrupted_compressed_section_reports_section_offset() {
        let (mut bytes, _) = write_capture(&mixed_batches(), compressed_options(CompressionCodec::Deflate));
        let registry = VersionRegistry::shared();

        // Flip the stored crc of the first section.
        let first = CaptureFileHeader::LEN;
        let len = u32::from_le_bytes([bytes[first + 4], bytes[first + 5], bytes[first + 6], bytes[first + 7]]) as usize;
        let crc_last = first + SectionHeader::LEN + len - 1;
        bytes[crc_last] ^= 0x01;

        let mut reader = CaptureReader::new(&bytes[..], registry, ReaderOptions::default()).unwrap();
        let section = reader.next_section().unwrap().unwrap();
        let err = section.records().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSection);
        assert_eq!(err.offset(), Some(first as u64));
        assert!(err.to_string().contains("deflate"), "{}", err);

        // Later sections are unaffected.
        let next = reader.next_section().unwrap().unwrap();
        assert!(next.records().is_ok());
    }
}
