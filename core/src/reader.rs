//! reader.rs
//! Forward-only capture reader.
//!
//! State machine: `HeaderValidated -> Iterating -> Eof | Failed`.
//!
//! - Header-level errors abort `new`/`open`.
//! - Sections of unknown kinds or versions are stepped over using their declared length
//!   (recorded as [`SkippedSection`]) unless `strict` is set.
//! - Framing damage (truncation, oversized lengths, a missing or inconsistent end marker) is
//!   `MalformedSection` and ends iteration. Sections already returned stay valid.

use std::fmt;
use std::io::Read;
use std::iter::FusedIterator;
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::compression::{decompress_payload, CompressionCodec};
use crate::constants::{DEFAULT_MAX_SECTION_LEN, END_OF_CAPTURE_VERSION, MAGIC_KCAP};
use crate::headers::{decode_header_le, CaptureFileHeader};
use crate::io::{open_input, read_exact_or_eof, InputSource};
use crate::records::Records;
use crate::registry::VersionRegistry;
use crate::section::{parse_section_header, RawSection, SectionHeader, SectionKind};
use crate::telemetry::CaptureCounters;
use crate::types::{CaptureError, Result};

/// Reader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderOptions {
    /// Fail on the first section whose kind or version this build cannot decode.
    pub strict: bool,
    /// Accept a capture that ends at a section boundary without an end-of-capture marker.
    pub tolerate_unclosed: bool,
    /// Largest declared section length accepted.
    pub max_section_len: u32,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            strict: false,
            tolerate_unclosed: false,
            max_section_len: DEFAULT_MAX_SECTION_LEN,
        }
    }
}

impl ReaderOptions {
    pub fn strict() -> Self {
        Self { strict: true, ..Self::default() }
    }

    /// For salvaging captures whose writer never called `close()`.
    pub fn salvage() -> Self {
        Self { tolerate_unclosed: true, ..Self::default() }
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| CaptureError::InvalidConfig(format!("reader options: {}", e)))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_section_len == 0 {
            return Err(CaptureError::InvalidConfig("max_section_len must be non-zero".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReaderState {
    HeaderValidated,
    Iterating,
    Eof,
    Failed,
}

/// A section stepped over in non-strict mode.
#[derive(Debug)]
pub struct SkippedSection {
    pub offset: u64,
    pub kind_id: u16,
    pub version: u16,
    pub length: u32,
    /// `UnknownKind` or `UnsupportedVersion`.
    pub error: CaptureError,
}

/// One framed section. Records are decoded on demand by [`Section::records`].
#[derive(Debug, Clone)]
pub struct Section {
    offset: u64,
    header: SectionHeader,
    payload: Bytes,
    compression: Option<CompressionCodec>,
    max_len: u32,
    registry: Arc<VersionRegistry>,
}

impl Section {
    pub(crate) fn new(
        offset: u64,
        header: SectionHeader,
        payload: Bytes,
        compression: Option<CompressionCodec>,
        max_len: u32,
        registry: Arc<VersionRegistry>,
    ) -> Self {
        Self { offset, header, payload, compression, max_len, registry }
    }

    /// Absolute offset of the section header.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn payload_offset(&self) -> u64 {
        self.offset + SectionHeader::LEN as u64
    }

    pub fn header(&self) -> &SectionHeader {
        &self.header
    }

    pub fn kind(&self) -> Option<SectionKind> {
        self.header.kind()
    }

    /// Payload bytes as stored (compressed when the capture is).
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn compression(&self) -> Option<CompressionCodec> {
        self.compression
    }

    /// Decode the records: decompress if needed, then dispatch to the codec registered for
    /// this section's (kind, version).
    pub fn records(&self) -> Result<Records> {
        let codec = self
            .registry
            .decoder(self.header.kind_id, self.header.version, self.offset)?;

        match self.compression {
            None => codec.decode(&self.header, &self.payload, self.payload_offset()),
            Some(c) => {
                let plain = decompress_payload(c, &self.payload, self.max_len as usize).map_err(|e| {
                    CaptureError::malformed(self.offset, format!("{} payload: {}", c.name(), e))
                })?;
                // Positions inside decompressed bytes are not file offsets; report the section.
                let base = self.payload_offset();
                codec.decode(&self.header, &plain, base).map_err(|e| match e {
                    CaptureError::MalformedSection { offset, reason } => CaptureError::malformed(
                        self.offset,
                        format!("{} (decompressed byte {})", reason, offset.saturating_sub(base)),
                    ),
                    other => other,
                })
            }
        }
    }

    /// The section exactly as framed, for pass-through copying.
    pub fn raw(&self) -> RawSection {
        RawSection {
            header: self.header,
            payload: self.payload.clone(),
        }
    }
}

enum Step {
    Section(Section),
    Skipped,
    End,
}

pub struct CaptureReader<R: Read> {
    inner: R,
    registry: Arc<VersionRegistry>,
    options: ReaderOptions,
    header: CaptureFileHeader,
    position: u64,
    state: ReaderState,
    sections_seen: u64,
    skipped: Vec<SkippedSection>,
    counters: CaptureCounters,
}

impl CaptureReader<Box<dyn std::io::Read + Send>> {
    pub fn open(src: InputSource, registry: Arc<VersionRegistry>, options: ReaderOptions) -> Result<Self> {
        let inner = open_input(src)?;
        Self::new(inner, registry, options)
    }
}

impl<R: Read> fmt::Debug for CaptureReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureReader")
            .field("header", &self.header)
            .field("state", &self.state)
            .field("position", &self.position)
            .field("sections_seen", &self.sections_seen)
            .field("skipped", &self.skipped.len())
            .finish()
    }
}

impl<R: Read> CaptureReader<R> {
    /// Read and validate the file header. No section is touched before it passes.
    pub fn new(mut inner: R, registry: Arc<VersionRegistry>, options: ReaderOptions) -> Result<Self> {
        options.validate()?;
        let header = read_file_header(&mut inner)?;

        let mut counters = CaptureCounters::default();
        counters.add_header(CaptureFileHeader::LEN);
        info!("capture opened for reading: {}", header.summary());

        Ok(Self {
            inner,
            registry,
            options,
            header,
            position: CaptureFileHeader::LEN as u64,
            state: ReaderState::HeaderValidated,
            sections_seen: 0,
            skipped: Vec::new(),
            counters,
        })
    }

    /// Next decodable section, `Ok(None)` once the end-of-capture marker has been read.
    ///
    /// After an error or EOF every further call returns `Ok(None)`.
    pub fn next_section(&mut self) -> Result<Option<Section>> {
        loop {
            if matches!(self.state, ReaderState::Eof | ReaderState::Failed) {
                return Ok(None);
            }
            match self.read_step() {
                Ok(Step::Section(section)) => {
                    self.state = ReaderState::Iterating;
                    return Ok(Some(section));
                }
                Ok(Step::Skipped) => {
                    self.state = ReaderState::Iterating;
                }
                Ok(Step::End) => {
                    self.state = ReaderState::Eof;
                    info!(
                        "capture read: {} sections, {} skipped",
                        self.counters.sections, self.counters.sections_skipped
                    );
                    return Ok(None);
                }
                Err(e) => {
                    self.state = ReaderState::Failed;
                    return Err(e);
                }
            }
        }
    }

    fn read_step(&mut self) -> Result<Step> {
        let offset = self.position;

        let mut hdr = [0u8; SectionHeader::LEN];
        let n = read_exact_or_eof(&mut self.inner, &mut hdr).map_err(|e| CaptureError::io(offset, e))?;
        if n == 0 {
            if self.options.tolerate_unclosed {
                warn!("capture ends at offset {} without an end-of-capture marker", offset);
                return Ok(Step::End);
            }
            return Err(CaptureError::malformed(offset, "capture not closed: end-of-capture marker missing"));
        }
        let header = parse_section_header(&hdr[..n], offset)?;
        self.position += SectionHeader::LEN as u64;

        if header.is_end_marker() {
            self.check_end_marker(offset, &header)?;
            return Ok(Step::End);
        }

        if header.length > self.options.max_section_len {
            return Err(CaptureError::malformed(
                offset,
                format!(
                    "declared length {} exceeds the {} byte section limit",
                    header.length, self.options.max_section_len
                ),
            ));
        }

        // `take` keeps allocation bounded by the bytes actually present.
        let len = header.length as usize;
        let mut payload = Vec::new();
        self.inner
            .by_ref()
            .take(len as u64)
            .read_to_end(&mut payload)
            .map_err(|e| CaptureError::io(self.position, e))?;
        if payload.len() < len {
            return Err(CaptureError::malformed(
                offset,
                format!("section payload truncated: {} of {} bytes", payload.len(), len),
            ));
        }
        self.position += len as u64;
        self.sections_seen += 1;

        if let Err(e) = self.registry.decoder(header.kind_id, header.version, offset) {
            if !e.is_recoverable() || self.options.strict {
                return Err(e);
            }
            warn!("skipping section at offset {}: {}", offset, e);
            self.counters.add_skipped(len, SectionHeader::LEN);
            self.skipped.push(SkippedSection {
                offset,
                kind_id: header.kind_id,
                version: header.version,
                length: header.length,
                error: e,
            });
            return Ok(Step::Skipped);
        }

        let compression = self.header.compression();
        let plain_len = match compression {
            Some(_) if payload.len() >= 4 => LittleEndian::read_u32(&payload[0..4]) as usize,
            _ => len,
        };
        self.counters.add_section(header.record_count, plain_len, len, SectionHeader::LEN);
        debug!("section read at offset {}: {}", offset, header.summary());

        Ok(Step::Section(Section::new(
            offset,
            header,
            Bytes::from(payload),
            compression,
            self.options.max_section_len,
            Arc::clone(&self.registry),
        )))
    }

    fn check_end_marker(&mut self, offset: u64, header: &SectionHeader) -> Result<()> {
        if header.version != END_OF_CAPTURE_VERSION || header.length != 0 {
            return Err(CaptureError::malformed(
                offset,
                format!("bad end-of-capture marker: {}", header.summary()),
            ));
        }
        if u64::from(header.record_count) != self.sections_seen {
            return Err(CaptureError::malformed(
                offset,
                format!(
                    "end-of-capture marker declares {} sections, found {}",
                    header.record_count, self.sections_seen
                ),
            ));
        }
        let mut probe = [0u8; 1];
        let n = read_exact_or_eof(&mut self.inner, &mut probe).map_err(|e| CaptureError::io(self.position, e))?;
        if n != 0 {
            return Err(CaptureError::malformed(self.position, "data after end-of-capture marker"));
        }
        self.counters.add_end_marker(SectionHeader::LEN);
        Ok(())
    }

    pub fn file_header(&self) -> &CaptureFileHeader {
        &self.header
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn counters(&self) -> &CaptureCounters {
        &self.counters
    }

    pub fn skipped(&self) -> &[SkippedSection] {
        &self.skipped
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn registry(&self) -> &Arc<VersionRegistry> {
        &self.registry
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for CaptureReader<R> {
    type Item = Result<Section>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_section().transpose()
    }
}

impl<R: Read> FusedIterator for CaptureReader<R> {}

/// Read and validate the file header from the start of `r`.
///
/// A source that is too short but already shows foreign magic reports `BadMagic`.
pub(crate) fn read_file_header<R: Read + ?Sized>(r: &mut R) -> Result<CaptureFileHeader> {
    let mut buf = [0u8; CaptureFileHeader::LEN];
    let n = read_exact_or_eof(r, &mut buf).map_err(|e| CaptureError::io(0, e))?;
    if n >= MAGIC_KCAP.len() && buf[..4] != MAGIC_KCAP {
        let mut found = [0u8; 4];
        found.copy_from_slice(&buf[..4]);
        return Err(CaptureError::BadMagic { offset: 0, found });
    }
    decode_header_le(&buf[..n], 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_reports_position_and_state() {
        let header = CaptureFileHeader::new(7, None);
        let mut bytes = crate::headers::encode_header_le(&header).to_vec();
        bytes.extend_from_slice(&crate::section::encode_section_header(&SectionHeader::end_marker(0)));

        let reader = CaptureReader::new(&bytes[..], VersionRegistry::shared(), ReaderOptions::default()).unwrap();
        let text = format!("{:?}", reader);
        assert!(text.starts_with("CaptureReader"), "{}", text);
        assert!(text.contains("HeaderValidated"), "{}", text);
        assert!(text.contains(&format!("position: {}", CaptureFileHeader::LEN)), "{}", text);
    }

    #[test]
    fn default_options_are_lenient() {
        let opts = ReaderOptions::default();
        assert!(!opts.strict);
        assert!(!opts.tolerate_unclosed);
        assert_eq!(opts.max_section_len, DEFAULT_MAX_SECTION_LEN);
    }

    #[test]
    fn options_load_from_json() {
        let opts = ReaderOptions::from_json(r#"{ "strict": true }"#).unwrap();
        assert_eq!(opts, ReaderOptions::strict());

        let err = ReaderOptions::from_json(r#"{ "max_section_len": 0 }"#).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidConfig(_)));
        assert!(ReaderOptions::from_json("not json").is_err());
    }

    #[test]
    fn short_foreign_input_is_bad_magic() {
        let err = read_file_header(&mut &b"PK\x03\x04\x00"[..]).unwrap_err();
        assert!(matches!(err, CaptureError::BadMagic { offset: 0, .. }));

        let err = read_file_header(&mut &b"KC"[..]).unwrap_err();
        assert!(matches!(err, CaptureError::Io { .. }));
    }
}
