//! telemetry/snapshot.rs
//! Immutable summary of a closed capture.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::compression::CompressionCodec;
use crate::telemetry::counters::CaptureCounters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub counters: CaptureCounters,
    /// Header timestamp, nanoseconds since the Unix epoch.
    pub created_at: u64,
    pub compression: Option<CompressionCodec>,
    /// Sections written per kind name, e.g. `"kevt"`.
    pub sections_by_kind: BTreeMap<String, u64>,
    /// Sections that were copied through verbatim.
    pub raw_sections: u64,
    /// Total bytes in the capture, header to end marker.
    pub total_bytes: u64,
    /// Hex blake3 digest of every byte written.
    pub digest: String,
}

impl CaptureSummary {
    pub fn compression_ratio(&self) -> f64 {
        self.counters.compression_ratio()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
