// Truncation suite: cutting a capture anywhere must keep every fully written section readable
// and report the damaged one as `MalformedSection`.

mod common;

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use kcap_core::prelude::*;

    use crate::common::{compressed_options, mixed_batches, options, write_capture};

    /// Section boundaries of a closed capture: (header offset, end offset) per section.
    fn layout(bytes: &[u8]) -> Vec<(u64, u64)> {
        let reader = CaptureReader::new(bytes, VersionRegistry::shared(), ReaderOptions::default()).unwrap();
        reader
            .map(|s| s.unwrap())
            .map(|s| (s.offset(), s.payload_offset() + u64::from(s.header().length)))
            .collect()
    }

    /// Read `bytes` to the end, returning the decoded batches and the error that stopped it.
    fn read_until_error(bytes: &[u8], opts: ReaderOptions) -> (Vec<Records>, Option<CaptureError>) {
        let mut reader = CaptureReader::new(bytes, VersionRegistry::shared(), opts).unwrap();
        let mut out = Vec::new();
        loop {
            match reader.next_section() {
                Ok(Some(section)) => out.push(section.records().unwrap()),
                Ok(None) => return (out, None),
                Err(e) => return (out, Some(e)),
            }
        }
    }

    fn check_cut(bytes: &[u8], batches: &[Records], sections: &[(u64, u64)], cut: usize) {
        let truncated = &bytes[..cut];
        let cut = cut as u64;

        if cut < CaptureFileHeader::LEN as u64 {
            let err = CaptureReader::new(truncated, VersionRegistry::shared(), ReaderOptions::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Io, "cut {}", cut);
            return;
        }

        let (decoded, err) = read_until_error(truncated, ReaderOptions::default());
        let complete = sections.iter().filter(|(_, end)| *end <= cut).count();
        assert_eq!(decoded, batches[..complete].to_vec(), "cut {}", cut);

        let err = err.unwrap_or_else(|| panic!("cut {} read cleanly", cut));
        assert_eq!(err.kind(), ErrorKind::MalformedSection, "cut {}: {}", cut, err);

        // The error points at the first section that is not fully present, or at the cut
        // itself when the cut falls on a section boundary.
        let expected = sections.get(complete).map(|(start, _)| *start).unwrap_or_else(|| {
            sections.last().map(|(_, end)| *end).unwrap_or(CaptureFileHeader::LEN as u64)
        });
        assert_eq!(err.offset(), Some(expected), "cut {}: {}", cut, err);
    }

    #[test]
    fn every_cut_point_keeps_prior_sections() {
        let batches = mixed_batches();
        let (bytes, _) = write_capture(&batches, options());
        let sections = layout(&bytes);

        for cut in 0..bytes.len() {
            check_cut(&bytes, &batches, &sections, cut);
        }
    }

    #[test]
    fn cut_inside_payload_of_compressed_capture() {
        let batches = mixed_batches();
        let (bytes, _) = write_capture(&batches, compressed_options(CompressionCodec::Lz4));
        let sections = layout(&bytes);

        let (start, end) = sections[2];
        check_cut(&bytes, &batches, &sections, ((start + end) / 2) as usize);
    }

    #[test]
    fn salvage_mode_never_relaxes_payload_truncation() {
        let batches = mixed_batches();
        let (bytes, _) = write_capture(&batches, options());
        let sections = layout(&bytes);

        // At a section boundary salvage succeeds.
        let boundary = sections[2].1 as usize;
        let (decoded, err) = read_until_error(&bytes[..boundary], ReaderOptions::salvage());
        assert!(err.is_none());
        assert_eq!(decoded, batches[..3].to_vec());

        // Inside a payload it still fails.
        let (decoded, err) = read_until_error(&bytes[..boundary + 20], ReaderOptions::salvage());
        assert_eq!(decoded.len(), 3);
        assert_eq!(err.unwrap().offset(), Some(sections[3].0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_truncation_is_contained(keep in 1usize..6, frac in 0.0f64..1.0) {
            let batches: Vec<Records> = mixed_batches().into_iter().cycle().take(keep).collect();
            let (bytes, _) = write_capture(&batches, options());
            let sections = layout(&bytes);
            let cut = (bytes.len() as f64 * frac) as usize;
            check_cut(&bytes, &batches, &sections, cut);
        }
    }
}
