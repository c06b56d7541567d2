//! Process section codec.
//!
//! v1 per process:
//!
//! ```text
//! pid u32 | ppid u32 | name | cmdline | exe | cwd | sid | session_id u32 | args | envs
//! ```

use crate::codec::wire::{WireError, WireReader, WireWriter};
use crate::codec::{kind_mismatch, SectionCodec};
use crate::records::{ProcessSnapshot, Records};
use crate::section::SectionKind;
use crate::version::{SectionVersion, PROCESS_SEC_V1};

pub struct ProcessCodecV1;

impl SectionCodec for ProcessCodecV1 {
    fn kind(&self) -> SectionKind {
        SectionKind::Process
    }

    fn version(&self) -> SectionVersion {
        PROCESS_SEC_V1
    }

    fn encode_records(&self, records: &Records, w: &mut WireWriter) -> Result<(), WireError> {
        let Records::Processes(procs) = records else {
            return Err(kind_mismatch(self.kind(), records));
        };
        for p in procs {
            w.put_u32(p.pid)?;
            w.put_u32(p.ppid)?;
            w.put_str(&p.name)?;
            w.put_str(&p.cmdline)?;
            w.put_str(&p.exe)?;
            w.put_str(&p.cwd)?;
            w.put_str(&p.sid)?;
            w.put_u32(p.session_id)?;
            w.put_str_list(&p.args)?;
            w.put_str_map(&p.envs)?;
        }
        Ok(())
    }

    fn decode_records(&self, r: &mut WireReader<'_>, count: usize) -> Result<Records, WireError> {
        let mut procs = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            procs.push(ProcessSnapshot {
                pid: r.u32()?,
                ppid: r.u32()?,
                name: r.str()?,
                cmdline: r.str()?,
                exe: r.str()?,
                cwd: r.str()?,
                sid: r.str()?,
                session_id: r.u32()?,
                args: r.str_list()?,
                envs: r.str_map()?,
            });
        }
        Ok(Records::Processes(procs))
    }
}
