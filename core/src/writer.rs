//! writer.rs
//! Sequential, append-only capture writer.
//!
//! Layout produced:
//! ```text
//! CaptureFileHeader (15 bytes)
//! repeated: SectionHeader (12 bytes) + payload
//! end-of-capture marker (SectionHeader, kind 0xFFFF)
//! ```
//! The writer never seeks. Sections appear in the order they were written.

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::compression::{check_level, create_compressor, CompressionCodec, Compressor};
use crate::headers::{encode_header_le, CaptureFileHeader};
use crate::io::{open_output, OutputSink, Sink};
use crate::reader::Section;
use crate::records::Records;
use crate::registry::VersionRegistry;
use crate::section::{encode_section_header, RawSection, SectionHeader, SectionKind};
use crate::telemetry::{CaptureCounters, CaptureSummary};
use crate::types::{CaptureError, Result};

/// Writer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriterOptions {
    /// Compress every section payload with this codec.
    pub compression: Option<CompressionCodec>,
    /// Codec level; `None` uses the codec default.
    pub compression_level: Option<i32>,
    /// Header timestamp in nanoseconds. `None` stamps the current UTC time.
    pub created_at: Option<u64>,
}

impl WriterOptions {
    pub fn compressed(codec: CompressionCodec) -> Self {
        Self { compression: Some(codec), ..Self::default() }
    }

    pub fn with_created_at(mut self, created_at: u64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| CaptureError::InvalidConfig(format!("writer options: {}", e)))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if self.compression.is_none() && self.compression_level.is_some() {
            return Err(CaptureError::InvalidConfig(
                "compression_level set without a compression codec".into(),
            ));
        }
        if let (Some(codec), Some(level)) = (self.compression, self.compression_level) {
            check_level(codec, level)
                .map_err(|e| CaptureError::InvalidConfig(format!("compression_level: {}", e)))?;
        }
        Ok(())
    }
}

/// Where a section landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenSection {
    /// Absolute offset of the section header.
    pub offset: u64,
    pub header: SectionHeader,
}

pub struct CaptureWriter<W: Sink> {
    inner: W,
    registry: Arc<VersionRegistry>,
    header: CaptureFileHeader,
    compressor: Option<Box<dyn Compressor + Send>>,
    position: u64,
    sections: u32,
    raw_sections: u64,
    sections_by_kind: BTreeMap<String, u64>,
    counters: CaptureCounters,
    hasher: blake3::Hasher,
    poisoned: bool,
}

impl CaptureWriter<Box<dyn Sink + Send>> {
    /// Open an [`OutputSink`] and write the file header.
    ///
    /// For `OutputSink::Memory` the shared buffer is returned alongside the writer.
    pub fn create(
        sink: OutputSink,
        registry: Arc<VersionRegistry>,
        options: WriterOptions,
    ) -> Result<(Self, Option<Arc<Mutex<Vec<u8>>>>)> {
        let (inner, maybe_buf) = open_output(sink)?;
        let writer = Self::new(inner, registry, options)?;
        Ok((writer, maybe_buf))
    }
}

impl<W: Sink> CaptureWriter<W> {
    /// Write the file header to `inner` and return a writer positioned after it.
    pub fn new(inner: W, registry: Arc<VersionRegistry>, options: WriterOptions) -> Result<Self> {
        options.validate()?;

        let created_at = match options.created_at {
            Some(ts) => ts,
            None => now_nanos()?,
        };
        let compressor = match options.compression {
            Some(codec) => Some(create_compressor(codec, options.compression_level)?),
            None => None,
        };
        let header = CaptureFileHeader::new(created_at, options.compression);

        let mut writer = Self {
            inner,
            registry,
            header,
            compressor,
            position: 0,
            sections: 0,
            raw_sections: 0,
            sections_by_kind: BTreeMap::new(),
            counters: CaptureCounters::default(),
            hasher: blake3::Hasher::new(),
            poisoned: false,
        };

        writer.write_bytes(&encode_header_le(&header))?;
        writer.counters.add_header(CaptureFileHeader::LEN);
        info!("capture opened: {}", header.summary());
        Ok(writer)
    }

    /// Encode `records` with the registry's current codec for their kind and append the section.
    ///
    /// Encoding and compression happen before anything is written, so an `Encode` error leaves
    /// the output untouched.
    pub fn write_section(&mut self, records: &Records) -> Result<WrittenSection> {
        self.ensure_usable()?;
        let kind = records.kind();

        let (version, payload) = {
            let codec = self.registry.encoder(kind)?;
            (codec.version(), codec.encode(records)?)
        };
        let record_count = u32::try_from(records.len()).map_err(|_| CaptureError::Encode {
            kind,
            reason: format!("{} records exceed the u32 record count", records.len()),
        })?;

        let payload_len = payload.len();
        let stored = match self.compressor.as_mut() {
            Some(c) => {
                let mut out = Vec::with_capacity(payload_len / 2 + 8);
                c.compress_chunk(&payload, &mut out)?;
                out
            }
            None => payload,
        };
        let length = u32::try_from(stored.len()).map_err(|_| CaptureError::Encode {
            kind,
            reason: format!("payload of {} bytes exceeds the u32 section length", stored.len()),
        })?;

        let header = SectionHeader::new(kind, version, length, record_count);
        let offset = self.append_section(&header, &stored)?;

        self.counters.add_section(record_count, payload_len, stored.len(), SectionHeader::LEN);
        *self.sections_by_kind.entry(kind.name().to_string()).or_insert(0) += 1;
        debug!("section written at offset {}: {}", offset, header.summary());
        Ok(WrittenSection { offset, header })
    }

    /// Append an already-framed section verbatim.
    ///
    /// The payload is written as-is, so it must have been produced with this capture's
    /// compression setting. Kinds and versions this build cannot decode are accepted.
    pub fn copy_raw_section(&mut self, raw: &RawSection) -> Result<WrittenSection> {
        self.ensure_usable()?;
        if raw.header.is_end_marker() {
            return Err(CaptureError::InvalidConfig(
                "the end-of-capture marker cannot be copied as a section".into(),
            ));
        }
        if raw.header.length as usize != raw.payload.len() {
            return Err(CaptureError::InvalidConfig(format!(
                "raw section declares {} bytes but carries {}",
                raw.header.length,
                raw.payload.len()
            )));
        }

        let offset = self.append_section(&raw.header, &raw.payload)?;

        self.counters.add_section(raw.header.record_count, raw.payload.len(), raw.payload.len(), SectionHeader::LEN);
        self.raw_sections += 1;
        let key = match raw.header.kind() {
            Some(kind) => kind.name().to_string(),
            None => format!("0x{:04x}", raw.header.kind_id),
        };
        *self.sections_by_kind.entry(key).or_insert(0) += 1;
        debug!("raw section copied to offset {}: {}", offset, raw.header.summary());
        Ok(WrittenSection { offset, header: raw.header })
    }

    /// Copy a section read from another capture, checking that both use the same compression.
    pub fn copy_section(&mut self, section: &Section) -> Result<WrittenSection> {
        if section.compression() != self.header.compression() {
            return Err(CaptureError::InvalidConfig(format!(
                "cannot copy a section compressed with {:?} into a capture using {:?}",
                section.compression(),
                self.header.compression()
            )));
        }
        self.copy_raw_section(&section.raw())
    }

    /// Write the end-of-capture marker, finalize the sink and summarise the capture.
    pub fn close(self) -> Result<CaptureSummary> {
        self.close_into_inner().map(|(_, summary)| summary)
    }

    /// Like [`close`](Self::close), also handing back the sink.
    pub fn close_into_inner(mut self) -> Result<(W, CaptureSummary)> {
        self.ensure_usable()?;

        let marker = SectionHeader::end_marker(self.sections);
        self.write_bytes(&encode_section_header(&marker))?;
        self.counters.add_end_marker(SectionHeader::LEN);

        if let Err(e) = self.inner.finalize() {
            warn!("capture finalize failed at offset {}: {}", self.position, e);
            return Err(CaptureError::io(self.position, e));
        }

        let CaptureWriter {
            inner,
            header,
            position,
            raw_sections,
            sections_by_kind,
            counters,
            hasher,
            ..
        } = self;

        let summary = CaptureSummary {
            counters,
            created_at: header.created_at,
            compression: header.compression(),
            sections_by_kind,
            raw_sections,
            total_bytes: position,
            digest: hex::encode(hasher.finalize().as_bytes()),
        };
        info!(
            "capture closed: {} sections, {} bytes, blake3 {}",
            summary.counters.sections, summary.total_bytes, summary.digest
        );
        Ok((inner, summary))
    }

    pub fn file_header(&self) -> &CaptureFileHeader {
        &self.header
    }

    /// Bytes written so far; also the offset of the next section.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn sections_written(&self) -> u32 {
        self.sections
    }

    pub fn counters(&self) -> &CaptureCounters {
        &self.counters
    }

    pub fn registry(&self) -> &Arc<VersionRegistry> {
        &self.registry
    }

    /// True after an I/O failure; every later call fails.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Version written for `kind`.
    pub fn write_version(&self, kind: SectionKind) -> Option<u16> {
        self.registry.current_version(kind)
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.poisoned {
            return Err(CaptureError::io(
                self.position,
                io::Error::new(io::ErrorKind::Other, "capture writer poisoned by an earlier I/O failure"),
            ));
        }
        Ok(())
    }

    fn append_section(&mut self, header: &SectionHeader, payload: &[u8]) -> Result<u64> {
        let next = self.sections.checked_add(1).ok_or_else(|| {
            CaptureError::InvalidConfig("capture already holds u32::MAX sections".into())
        })?;
        let offset = self.position;
        self.write_bytes(&encode_section_header(header))?;
        self.write_bytes(payload)?;
        self.sections = next;
        Ok(offset)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        if let Err(e) = self.inner.write_all(buf) {
            self.poisoned = true;
            warn!("capture writer poisoned at offset {}: {}", self.position, e);
            return Err(CaptureError::io(self.position, e));
        }
        self.hasher.update(buf);
        self.position += buf.len() as u64;
        Ok(())
    }
}

fn now_nanos() -> Result<u64> {
    Utc::now()
        .timestamp_nanos_opt()
        .and_then(|ns| u64::try_from(ns).ok())
        .ok_or_else(|| CaptureError::InvalidConfig("system clock outside the nanosecond timestamp range".into()))
}
