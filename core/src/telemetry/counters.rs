//! telemetry/counters.rs
//! Mutable counters kept by writers, readers and the index.
//!
//! Summary: section and byte counts, folded into a `CaptureSummary` on close.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Deterministic counters collected while writing or reading a capture.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureCounters {
    pub sections: u64,
    pub sections_skipped: u64,
    pub records: u64,
    /// Codec-encoded bytes, before compression.
    pub bytes_payload: u64,
    /// Payload bytes as stored on disk (equal to `bytes_payload` when uncompressed).
    pub bytes_stored: u64,
    /// File header, section headers and the end marker.
    pub bytes_overhead: u64,
}

impl CaptureCounters {
    /// Record the file header as overhead.
    pub fn add_header(&mut self, header_len: usize) {
        self.bytes_overhead += header_len as u64;
    }

    /// Record one section.
    ///
    /// - `records`: logical record count from the section header
    /// - `payload_len`: encoded length before compression
    /// - `stored_len`: length of the payload in the file
    /// - `header_len`: section header length
    pub fn add_section(&mut self, records: u32, payload_len: usize, stored_len: usize, header_len: usize) {
        self.sections += 1;
        self.records += records as u64;
        self.bytes_payload += payload_len as u64;
        self.bytes_stored += stored_len as u64;
        self.bytes_overhead += header_len as u64;
    }

    /// Record a section that was stepped over without decoding.
    pub fn add_skipped(&mut self, stored_len: usize, header_len: usize) {
        self.sections_skipped += 1;
        self.bytes_stored += stored_len as u64;
        self.bytes_overhead += header_len as u64;
    }

    /// Record the end-of-capture marker.
    pub fn add_end_marker(&mut self, header_len: usize) {
        self.bytes_overhead += header_len as u64;
    }

    /// Total bytes of the capture accounted for so far.
    pub fn total_bytes(&self) -> u64 {
        self.bytes_stored + self.bytes_overhead
    }

    /// Stored / encoded payload ratio, 0.0 when nothing was written.
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_payload > 0 {
            self.bytes_stored as f64 / self.bytes_payload as f64
        } else {
            0.0
        }
    }

    pub fn merge(&mut self, other: &CaptureCounters) {
        self.sections += other.sections;
        self.sections_skipped += other.sections_skipped;
        self.records += other.records;
        self.bytes_payload += other.bytes_payload;
        self.bytes_stored += other.bytes_stored;
        self.bytes_overhead += other.bytes_overhead;
    }
}

impl AddAssign for CaptureCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_every_field() {
        let mut a = CaptureCounters::default();
        a.add_header(15);
        a.add_section(3, 100, 40, 12);

        let mut b = CaptureCounters::default();
        b.add_skipped(8, 12);
        b.add_end_marker(12);

        a += b;
        assert_eq!(a.sections, 1);
        assert_eq!(a.sections_skipped, 1);
        assert_eq!(a.records, 3);
        assert_eq!(a.bytes_payload, 100);
        assert_eq!(a.bytes_stored, 48);
        assert_eq!(a.bytes_overhead, 15 + 12 + 12 + 12);
        assert_eq!(a.total_bytes(), 48 + 51);
    }

    #[test]
    fn compression_ratio_handles_empty() {
        assert_eq!(CaptureCounters::default().compression_ratio(), 0.0);
        let mut c = CaptureCounters::default();
        c.add_section(1, 200, 50, 12);
        assert!((c.compression_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
