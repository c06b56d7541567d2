//! io.rs
//! Normalised capture sources and sinks.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::types::{CaptureError, Result};

/// Where a capture is read from.
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
}

/// Where a capture is written to.
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    /// In-memory buffer, handed back alongside the writer so callers can inspect it.
    Memory,
}

/// A `Write` that knows how to make its bytes durable.
///
/// `finalize` runs once from `CaptureWriter::close`. The default only flushes; file sinks also
/// `sync_all`.
pub trait Sink: Write {
    fn finalize(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for File {
    fn finalize(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

impl Sink for BufWriter<File> {
    fn finalize(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_ref().sync_all()
    }
}

impl Sink for Vec<u8> {}
impl Sink for Cursor<Vec<u8>> {}
impl Sink for Cursor<&mut Vec<u8>> {}
impl Sink for SharedBufferWriter {}
impl Sink for Box<dyn Write + Send> {}

impl Sink for Box<dyn Sink + Send> {
    fn finalize(&mut self) -> io::Result<()> {
        (**self).finalize()
    }
}

/// Normalize input source into a boxed reader
pub fn open_input(src: InputSource) -> Result<Box<dyn Read + Send>> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => r,
        InputSource::File(p) => Box::new(BufReader::new(File::open(p).map_err(|e| CaptureError::io(0, e))?)),
        InputSource::Memory(b) => Box::new(Cursor::new(b)),
    };
    Ok(reader)
}

/// Normalize output sink into a boxed sink, plus the shared buffer for `OutputSink::Memory`.
pub fn open_output(sink: OutputSink) -> Result<(Box<dyn Sink + Send>, Option<Arc<Mutex<Vec<u8>>>>)> {
    match sink {
        OutputSink::Writer(w) => Ok((Box::new(w), None)),
        OutputSink::File(p) => {
            let file = File::create(p).map_err(|e| CaptureError::io(0, e))?;
            Ok((Box::new(BufWriter::new(file)), None))
        }
        OutputSink::Memory => {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let writer = SharedBufferWriter { buf: buf.clone() };
            Ok((Box::new(writer), Some(buf)))
        }
    }
}

/// Appends into a buffer shared with the caller.
#[derive(Clone)]
pub struct SharedBufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl SharedBufferWriter {
    pub fn new(buf: Arc<Mutex<Vec<u8>>>) -> Self {
        Self { buf }
    }
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .buf
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "shared capture buffer poisoned"))?;
        guard.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fill `buf` from `r` until it is full or the stream ends; returns the number of bytes read.
///
/// Unlike `read_exact`, a short read is not an error, so callers can tell a clean end of stream
/// (0 bytes) from a truncated structure (some bytes).
pub fn read_exact_or_eof<R: Read + ?Sized>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut off = 0;
    while off < buf.len() {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(off)
}
