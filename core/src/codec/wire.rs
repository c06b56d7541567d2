//! Little-endian payload primitives shared by every section codec.
//!
//! Layout rules:
//! - strings: `u16` byte length + UTF-8 bytes
//! - byte blobs and sequences: `u32` count + elements
//! - string maps: `u32` count + key/value pairs in strictly ascending key order
//! - `f64`: IEEE-754 bit pattern as `u64`
//! - `bool`: one byte, 0 or 1

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

/// Encode/decode failure inside a payload. `position` is relative to the payload start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireError {
    pub position: usize,
    pub reason: String,
}

impl WireError {
    pub fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (payload byte {})", self.reason, self.position)
    }
}

impl std::error::Error for WireError {}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        WireError::new(0, e.to_string())
    }
}

/// Append-only payload builder.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn put_u8(&mut self, v: u8) -> Result<(), WireError> {
        self.buf.write_u8(v)?;
        Ok(())
    }

    pub fn put_u16(&mut self, v: u16) -> Result<(), WireError> {
        self.buf.write_u16::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn put_u32(&mut self, v: u32) -> Result<(), WireError> {
        self.buf.write_u32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn put_u64(&mut self, v: u64) -> Result<(), WireError> {
        self.buf.write_u64::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn put_i32(&mut self, v: i32) -> Result<(), WireError> {
        self.buf.write_i32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn put_i64(&mut self, v: i64) -> Result<(), WireError> {
        self.buf.write_i64::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn put_f64(&mut self, v: f64) -> Result<(), WireError> {
        self.put_u64(v.to_bits())
    }

    pub fn put_bool(&mut self, v: bool) -> Result<(), WireError> {
        self.put_u8(u8::from(v))
    }

    pub fn put_count(&mut self, n: usize) -> Result<(), WireError> {
        let n = u32::try_from(n)
            .map_err(|_| WireError::new(self.buf.len(), format!("count {} does not fit in u32", n)))?;
        self.put_u32(n)
    }

    pub fn put_str(&mut self, s: &str) -> Result<(), WireError> {
        let len = u16::try_from(s.len()).map_err(|_| {
            WireError::new(self.buf.len(), format!("string of {} bytes exceeds u16 length", s.len()))
        })?;
        self.put_u16(len)?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    pub fn put_bytes(&mut self, b: &[u8]) -> Result<(), WireError> {
        self.put_count(b.len())?;
        self.buf.extend_from_slice(b);
        Ok(())
    }

    pub fn put_str_list(&mut self, items: &[String]) -> Result<(), WireError> {
        self.put_count(items.len())?;
        for item in items {
            self.put_str(item)?;
        }
        Ok(())
    }

    pub fn put_str_map(&mut self, map: &BTreeMap<String, String>) -> Result<(), WireError> {
        self.put_count(map.len())?;
        for (k, v) in map {
            self.put_str(k)?;
            self.put_str(v)?;
        }
        Ok(())
    }
}

/// Bounds-checked cursor over a payload.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::new(
                self.pos,
                format!("truncated {}: need {} bytes, {} left", what, n, self.remaining()),
            ));
        }
        let buf = self.buf;
        let out = &buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1, "u8")?[0])
    }

    pub fn u16(&mut self) -> Result<u16, WireError> {
        Ok(LittleEndian::read_u16(self.take(2, "u16")?))
    }

    pub fn u32(&mut self) -> Result<u32, WireError> {
        Ok(LittleEndian::read_u32(self.take(4, "u32")?))
    }

    pub fn u64(&mut self) -> Result<u64, WireError> {
        Ok(LittleEndian::read_u64(self.take(8, "u64")?))
    }

    pub fn i32(&mut self) -> Result<i32, WireError> {
        Ok(LittleEndian::read_i32(self.take(4, "i32")?))
    }

    pub fn i64(&mut self) -> Result<i64, WireError> {
        Ok(LittleEndian::read_i64(self.take(8, "i64")?))
    }

    pub fn f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_bits(self.u64()?))
    }

    pub fn bool(&mut self) -> Result<bool, WireError> {
        let at = self.pos;
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::new(at, format!("invalid bool byte {}", other))),
        }
    }

    /// Read a `u32` element count. Every element takes at least one byte, so a count larger
    /// than what is left cannot be honest.
    pub fn count(&mut self) -> Result<usize, WireError> {
        let at = self.pos;
        let n = self.u32()? as usize;
        if n > self.remaining() {
            return Err(WireError::new(
                at,
                format!("count {} exceeds remaining {} bytes", n, self.remaining()),
            ));
        }
        Ok(n)
    }

    pub fn str(&mut self) -> Result<String, WireError> {
        let len = self.u16()? as usize;
        let at = self.pos;
        let raw = self.take(len, "string")?;
        String::from_utf8(raw.to_vec()).map_err(|e| WireError::new(at, format!("invalid utf-8: {}", e)))
    }

    pub fn bytes(&mut self) -> Result<Vec<u8>, WireError> {
        let len = self.count()?;
        Ok(self.take(len, "bytes")?.to_vec())
    }

    pub fn str_list(&mut self) -> Result<Vec<String>, WireError> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n.min(1024));
        for _ in 0..n {
            out.push(self.str()?);
        }
        Ok(out)
    }

    pub fn str_map(&mut self) -> Result<BTreeMap<String, String>, WireError> {
        let n = self.count()?;
        let mut out = BTreeMap::new();
        let mut last: Option<String> = None;
        for _ in 0..n {
            let at = self.pos;
            let k = self.str()?;
            if let Some(prev) = &last {
                if *prev >= k {
                    return Err(WireError::new(at, format!("map key {:?} out of order", k)));
                }
            }
            let v = self.str()?;
            last = Some(k.clone());
            out.insert(k, v);
        }
        Ok(out)
    }

    /// The payload must be consumed exactly.
    pub fn finish(&self) -> Result<(), WireError> {
        if self.remaining() != 0 {
            return Err(WireError::new(
                self.pos,
                format!("{} trailing bytes after last record", self.remaining()),
            ));
        }
        Ok(())
    }
}
