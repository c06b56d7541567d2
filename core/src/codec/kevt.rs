//! Kernel event section codecs.
//!
//! v1 per event:
//!
//! ```text
//! seq u64 | pid u32 | tid u32 | cpu u8 | name | category | description | host
//! | timestamp u64 | params (count u32, then name | tag u8 | value)
//! ```
//!
//! v2 appends the metadata string map to every event.

use std::collections::BTreeMap;

use crate::codec::wire::{WireError, WireReader, WireWriter};
use crate::codec::{kind_mismatch, SectionCodec};
use crate::records::{KernelEvent, Param, ParamValue, Records};
use crate::section::SectionKind;
use crate::version::{SectionVersion, KEVT_SEC_V1, KEVT_SEC_V2};

pub struct KevtCodecV1;

pub struct KevtCodecV2;

fn put_param(w: &mut WireWriter, p: &Param) -> Result<(), WireError> {
    w.put_str(&p.name)?;
    w.put_u8(p.value.tag())?;
    match &p.value {
        ParamValue::U8(v) => w.put_u8(*v),
        ParamValue::U16(v) => w.put_u16(*v),
        ParamValue::U32(v) => w.put_u32(*v),
        ParamValue::U64(v) => w.put_u64(*v),
        ParamValue::I32(v) => w.put_i32(*v),
        ParamValue::I64(v) => w.put_i64(*v),
        ParamValue::F64(v) => w.put_f64(*v),
        ParamValue::Bool(v) => w.put_bool(*v),
        ParamValue::Str(v) => w.put_str(v),
        ParamValue::Bytes(v) => w.put_bytes(v),
    }
}

fn read_param(r: &mut WireReader<'_>) -> Result<Param, WireError> {
    let name = r.str()?;
    let at = r.position();
    let value = match r.u8()? {
        1 => ParamValue::U8(r.u8()?),
        2 => ParamValue::U16(r.u16()?),
        3 => ParamValue::U32(r.u32()?),
        4 => ParamValue::U64(r.u64()?),
        5 => ParamValue::I32(r.i32()?),
        6 => ParamValue::I64(r.i64()?),
        7 => ParamValue::F64(r.f64()?),
        8 => ParamValue::Bool(r.bool()?),
        9 => ParamValue::Str(r.str()?),
        10 => ParamValue::Bytes(r.bytes()?),
        tag => return Err(WireError::new(at, format!("unknown param tag {} for {:?}", tag, name))),
    };
    Ok(Param { name, value })
}

/// Fields shared by every kevt layout so far.
fn put_event_v1(w: &mut WireWriter, e: &KernelEvent) -> Result<(), WireError> {
    w.put_u64(e.seq)?;
    w.put_u32(e.pid)?;
    w.put_u32(e.tid)?;
    w.put_u8(e.cpu)?;
    w.put_str(&e.name)?;
    w.put_str(&e.category)?;
    w.put_str(&e.description)?;
    w.put_str(&e.host)?;
    w.put_u64(e.timestamp)?;
    w.put_count(e.params.len())?;
    for p in &e.params {
        put_param(w, p)?;
    }
    Ok(())
}

fn read_event_v1(r: &mut WireReader<'_>) -> Result<KernelEvent, WireError> {
    let seq = r.u64()?;
    let pid = r.u32()?;
    let tid = r.u32()?;
    let cpu = r.u8()?;
    let name = r.str()?;
    let category = r.str()?;
    let description = r.str()?;
    let host = r.str()?;
    let timestamp = r.u64()?;
    let nparams = r.count()?;
    let mut params = Vec::with_capacity(nparams.min(64));
    for _ in 0..nparams {
        params.push(read_param(r)?);
    }
    Ok(KernelEvent {
        seq,
        pid,
        tid,
        cpu,
        name,
        category,
        description,
        host,
        timestamp,
        params,
        metadata: BTreeMap::new(),
    })
}

impl SectionCodec for KevtCodecV1 {
    fn kind(&self) -> SectionKind {
        SectionKind::KernelEvent
    }

    fn version(&self) -> SectionVersion {
        KEVT_SEC_V1
    }

    fn encode_records(&self, records: &Records, w: &mut WireWriter) -> Result<(), WireError> {
        let Records::KernelEvents(events) = records else {
            return Err(kind_mismatch(self.kind(), records));
        };
        for e in events {
            // v1 has nowhere to put metadata; silently dropping it would lose data.
            if !e.metadata.is_empty() {
                return Err(WireError::new(
                    w.len(),
                    format!("event seq {} carries metadata, which needs kevt v{}", e.seq, KEVT_SEC_V2),
                ));
            }
            put_event_v1(w, e)?;
        }
        Ok(())
    }

    fn decode_records(&self, r: &mut WireReader<'_>, count: usize) -> Result<Records, WireError> {
        let mut events = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            events.push(read_event_v1(r)?);
        }
        Ok(Records::KernelEvents(events))
    }
}

impl SectionCodec for KevtCodecV2 {
    fn kind(&self) -> SectionKind {
        SectionKind::KernelEvent
    }

    fn version(&self) -> SectionVersion {
        KEVT_SEC_V2
    }

    fn encode_records(&self, records: &Records, w: &mut WireWriter) -> Result<(), WireError> {
        let Records::KernelEvents(events) = records else {
            return Err(kind_mismatch(self.kind(), records));
        };
        for e in events {
            put_event_v1(w, e)?;
            w.put_str_map(&e.metadata)?;
        }
        Ok(())
    }

    fn decode_records(&self, r: &mut WireReader<'_>, count: usize) -> Result<Records, WireError> {
        let mut events = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let mut e = read_event_v1(r)?;
            e.metadata = r.str_map()?;
            events.push(e);
        }
        Ok(Records::KernelEvents(events))
    }
}
