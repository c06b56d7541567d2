//! index.rs
//! Section offset table built by walking section headers and seeking over payloads.
//!
//! Nothing is decoded while building; `load` reads a single section back for random access.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use bytes::Bytes;
use log::{debug, warn};

use crate::constants::END_OF_CAPTURE_VERSION;
use crate::headers::CaptureFileHeader;
use crate::reader::{read_file_header, ReaderOptions, Section};
use crate::registry::VersionRegistry;
use crate::section::{parse_section_header, SectionHeader, SectionKind};
use crate::types::{CaptureError, Result};

/// One indexed section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// Absolute offset of the section header.
    pub offset: u64,
    pub header: SectionHeader,
}

impl IndexEntry {
    pub fn payload_offset(&self) -> u64 {
        self.offset + SectionHeader::LEN as u64
    }

    pub fn kind(&self) -> Option<SectionKind> {
        self.header.kind()
    }
}

/// Read-only table of every section in a capture, in file order.
#[derive(Debug, Clone)]
pub struct CaptureIndex {
    header: CaptureFileHeader,
    entries: Vec<IndexEntry>,
    options: ReaderOptions,
    closed: bool,
    file_len: u64,
}

impl CaptureIndex {
    pub fn build<R: Read + Seek>(r: &mut R) -> Result<Self> {
        Self::build_with(r, ReaderOptions::default())
    }

    /// Same framing rules as the reader: `max_section_len` bounds each section and the
    /// end-of-capture marker is required unless `tolerate_unclosed` is set. `strict` has no
    /// effect since nothing is decoded.
    pub fn build_with<R: Read + Seek>(r: &mut R, options: ReaderOptions) -> Result<Self> {
        options.validate()?;

        let file_len = r.seek(SeekFrom::End(0)).map_err(|e| CaptureError::io(0, e))?;
        r.seek(SeekFrom::Start(0)).map_err(|e| CaptureError::io(0, e))?;
        let header = read_file_header(r)?;

        let mut entries = Vec::new();
        let mut pos = CaptureFileHeader::LEN as u64;
        let closed = loop {
            if pos == file_len {
                if options.tolerate_unclosed {
                    warn!("indexed capture ends at offset {} without an end-of-capture marker", pos);
                    break false;
                }
                return Err(CaptureError::malformed(pos, "capture not closed: end-of-capture marker missing"));
            }

            let available = (file_len - pos).min(SectionHeader::LEN as u64) as usize;
            let mut hdr = [0u8; SectionHeader::LEN];
            r.read_exact(&mut hdr[..available]).map_err(|e| CaptureError::io(pos, e))?;
            let header = parse_section_header(&hdr[..available], pos)?;
            let payload_start = pos + SectionHeader::LEN as u64;

            if header.is_end_marker() {
                if header.version != END_OF_CAPTURE_VERSION || header.length != 0 {
                    return Err(CaptureError::malformed(pos, format!("bad end-of-capture marker: {}", header.summary())));
                }
                if header.record_count as usize != entries.len() {
                    return Err(CaptureError::malformed(
                        pos,
                        format!(
                            "end-of-capture marker declares {} sections, found {}",
                            header.record_count,
                            entries.len()
                        ),
                    ));
                }
                if payload_start != file_len {
                    return Err(CaptureError::malformed(payload_start, "data after end-of-capture marker"));
                }
                break true;
            }

            if header.length > options.max_section_len {
                return Err(CaptureError::malformed(
                    pos,
                    format!("declared length {} exceeds the {} byte section limit", header.length, options.max_section_len),
                ));
            }
            let payload_end = payload_start + u64::from(header.length);
            if payload_end > file_len {
                return Err(CaptureError::malformed(
                    pos,
                    format!(
                        "section length {} exceeds remaining file size {}",
                        header.length,
                        file_len - payload_start
                    ),
                ));
            }

            entries.push(IndexEntry { offset: pos, header });
            r.seek(SeekFrom::Start(payload_end)).map_err(|e| CaptureError::io(payload_start, e))?;
            pos = payload_end;
        };

        debug!("indexed {} sections over {} bytes", entries.len(), file_len);
        Ok(Self { header, entries, options, closed, file_len })
    }

    pub fn file_header(&self) -> &CaptureFileHeader {
        &self.header
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Header offsets of every framed `kind` section, in file order.
    ///
    /// Sections whose version this build cannot decode are listed too: a lenient
    /// `CaptureReader` reports those through `skipped()` instead of yielding them.
    pub fn sections_of(&self, kind: SectionKind) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|e| e.header.kind_id == kind.id())
            .map(|e| e.offset)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// False only for captures indexed with `tolerate_unclosed` that lack the end marker.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Read the section at `entry` back from `r`.
    pub fn load<R: Read + Seek>(
        &self,
        r: &mut R,
        entry: &IndexEntry,
        registry: &Arc<VersionRegistry>,
    ) -> Result<Section> {
        let start = entry.payload_offset();
        r.seek(SeekFrom::Start(start)).map_err(|e| CaptureError::io(start, e))?;

        let len = entry.header.length as usize;
        let mut payload = Vec::new();
        r.by_ref()
            .take(len as u64)
            .read_to_end(&mut payload)
            .map_err(|e| CaptureError::io(start, e))?;
        if payload.len() < len {
            return Err(CaptureError::malformed(
                entry.offset,
                format!("section payload truncated: {} of {} bytes", payload.len(), len),
            ));
        }

        Ok(Section::new(
            entry.offset,
            entry.header,
            Bytes::from(payload),
            self.header.compression(),
            self.options.max_section_len,
            Arc::clone(registry),
        ))
    }
}
