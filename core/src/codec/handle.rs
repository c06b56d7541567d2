//! Handle section codec.
//!
//! v1 per handle: `num u64 | object u64 | pid u32 | handle_type | name`.

use crate::codec::wire::{WireError, WireReader, WireWriter};
use crate::codec::{kind_mismatch, SectionCodec};
use crate::records::{Handle, Records};
use crate::section::SectionKind;
use crate::version::{SectionVersion, HANDLE_SEC_V1};

pub struct HandleCodecV1;

impl SectionCodec for HandleCodecV1 {
    fn kind(&self) -> SectionKind {
        SectionKind::Handle
    }

    fn version(&self) -> SectionVersion {
        HANDLE_SEC_V1
    }

    fn encode_records(&self, records: &Records, w: &mut WireWriter) -> Result<(), WireError> {
        let Records::Handles(handles) = records else {
            return Err(kind_mismatch(self.kind(), records));
        };
        for h in handles {
            w.put_u64(h.num)?;
            w.put_u64(h.object)?;
            w.put_u32(h.pid)?;
            w.put_str(&h.handle_type)?;
            w.put_str(&h.name)?;
        }
        Ok(())
    }

    fn decode_records(&self, r: &mut WireReader<'_>, count: usize) -> Result<Records, WireError> {
        let mut handles = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            handles.push(Handle {
                num: r.u64()?,
                object: r.u64()?,
                pid: r.u32()?,
                handle_type: r.str()?,
                name: r.str()?,
            });
        }
        Ok(Records::Handles(handles))
    }
}
