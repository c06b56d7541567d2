//! PE section codec.
//!
//! v1 per image:
//!
//! ```text
//! pid u32 | nsections u16 | nsymbols u32 | image_base u64 | entry_point u64
//! | sections (count u32, then name | size u32 | entropy f64 | md5)
//! | symbols | imports | version_resources
//! ```

use crate::codec::wire::{WireError, WireReader, WireWriter};
use crate::codec::{kind_mismatch, SectionCodec};
use crate::records::{PeMetadata, PeSection, Records};
use crate::section::SectionKind;
use crate::version::{SectionVersion, PE_SEC_V1};

pub struct PeCodecV1;

impl SectionCodec for PeCodecV1 {
    fn kind(&self) -> SectionKind {
        SectionKind::Pe
    }

    fn version(&self) -> SectionVersion {
        PE_SEC_V1
    }

    fn encode_records(&self, records: &Records, w: &mut WireWriter) -> Result<(), WireError> {
        let Records::PeMetadata(images) = records else {
            return Err(kind_mismatch(self.kind(), records));
        };
        for pe in images {
            w.put_u32(pe.pid)?;
            w.put_u16(pe.nsections)?;
            w.put_u32(pe.nsymbols)?;
            w.put_u64(pe.image_base)?;
            w.put_u64(pe.entry_point)?;
            w.put_count(pe.sections.len())?;
            for s in &pe.sections {
                w.put_str(&s.name)?;
                w.put_u32(s.size)?;
                w.put_f64(s.entropy)?;
                w.put_str(&s.md5)?;
            }
            w.put_str_list(&pe.symbols)?;
            w.put_str_list(&pe.imports)?;
            w.put_str_map(&pe.version_resources)?;
        }
        Ok(())
    }

    fn decode_records(&self, r: &mut WireReader<'_>, count: usize) -> Result<Records, WireError> {
        let mut images = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            let pid = r.u32()?;
            let nsections = r.u16()?;
            let nsymbols = r.u32()?;
            let image_base = r.u64()?;
            let entry_point = r.u64()?;
            let n = r.count()?;
            let mut sections = Vec::with_capacity(n.min(96));
            for _ in 0..n {
                sections.push(PeSection {
                    name: r.str()?,
                    size: r.u32()?,
                    entropy: r.f64()?,
                    md5: r.str()?,
                });
            }
            images.push(PeMetadata {
                pid,
                nsections,
                nsymbols,
                image_base,
                entry_point,
                sections,
                symbols: r.str_list()?,
                imports: r.str_list()?,
                version_resources: r.str_map()?,
            });
        }
        Ok(Records::PeMetadata(images))
    }
}
