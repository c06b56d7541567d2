//! registry.rs
//! Section version registry: which (kind, version) layouts this build can read, and which
//! version it writes for each kind.
//!
//! Built once at startup, immutable afterwards, shared as `Arc<VersionRegistry>`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::codec::{HandleCodecV1, KevtCodecV1, KevtCodecV2, PeCodecV1, ProcessCodecV1, SectionCodec};
use crate::section::SectionKind;
use crate::types::{CaptureError, Result};
use crate::version::SectionVersion;

pub struct VersionRegistry {
    codecs: BTreeMap<(SectionKind, SectionVersion), Box<dyn SectionCodec>>,
    write_versions: BTreeMap<SectionKind, SectionVersion>,
}

impl VersionRegistry {
    /// Every codec shipped by this build, writing the newest version of each kind.
    pub fn try_builtin() -> Result<Self> {
        RegistryBuilder::new()
            .register(Box::new(KevtCodecV1))
            .register(Box::new(KevtCodecV2))
            .register(Box::new(ProcessCodecV1))
            .register(Box::new(HandleCodecV1))
            .register(Box::new(PeCodecV1))
            .build()
    }

    /// [`try_builtin`](Self::try_builtin) for callers that treat a broken codec table as a bug.
    ///
    /// # Panics
    /// If the builtin codecs skip or duplicate a version (`builtin_table_is_consistent` guards this).
    pub fn builtin() -> Self {
        match Self::try_builtin() {
            Ok(registry) => registry,
            Err(e) => panic!("builtin section registry is inconsistent: {}", e),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::builtin())
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Version the writer emits for `kind`.
    pub fn current_version(&self, kind: SectionKind) -> Option<SectionVersion> {
        self.write_versions.get(&kind).copied()
    }

    /// Highest version of `kind` this build can read.
    pub fn max_version(&self, kind: SectionKind) -> Option<SectionVersion> {
        self.versions(kind).last().copied()
    }

    /// All readable versions of `kind`, ascending.
    pub fn versions(&self, kind: SectionKind) -> Vec<SectionVersion> {
        self.codecs
            .range((kind, SectionVersion::MIN)..=(kind, SectionVersion::MAX))
            .map(|((_, v), _)| *v)
            .collect()
    }

    pub fn kinds(&self) -> Vec<SectionKind> {
        self.write_versions.keys().copied().collect()
    }

    /// Codec the writer uses for `kind`.
    pub fn encoder(&self, kind: SectionKind) -> Result<&dyn SectionCodec> {
        let version = self.current_version(kind).ok_or_else(|| {
            CaptureError::InvalidConfig(format!("no codec registered for {} sections", kind))
        })?;
        self.codecs
            .get(&(kind, version))
            .map(|c| c.as_ref())
            .ok_or_else(|| CaptureError::InvalidConfig(format!("no codec for {} v{}", kind, version)))
    }

    /// Codec able to read (`kind_id`, `version`) found at `offset`.
    ///
    /// `UnknownKind` when the kind id means nothing to this build, `UnsupportedVersion` when
    /// the kind is known but that layout is not.
    pub fn decoder(&self, kind_id: u16, version: SectionVersion, offset: u64) -> Result<&dyn SectionCodec> {
        let kind = SectionKind::from_id(kind_id).ok_or(CaptureError::UnknownKind { offset, kind_id })?;
        match self.codecs.get(&(kind, version)) {
            Some(codec) => Ok(codec.as_ref()),
            None => Err(CaptureError::UnsupportedVersion {
                offset,
                kind,
                version,
                max: self.max_version(kind).unwrap_or(0),
            }),
        }
    }

    pub fn supports(&self, kind_id: u16, version: SectionVersion) -> bool {
        SectionKind::from_id(kind_id)
            .map(|kind| self.codecs.contains_key(&(kind, version)))
            .unwrap_or(false)
    }
}

impl fmt::Debug for VersionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let readable: Vec<String> = self
            .codecs
            .keys()
            .map(|(kind, v)| format!("{}/v{}", kind, v))
            .collect();
        f.debug_struct("VersionRegistry")
            .field("readable", &readable)
            .field("write_versions", &self.write_versions)
            .finish()
    }
}

/// Collects codecs, then freezes them into a [`VersionRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    codecs: Vec<Box<dyn SectionCodec>>,
    pinned: BTreeMap<SectionKind, SectionVersion>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, codec: Box<dyn SectionCodec>) -> Self {
        self.codecs.push(codec);
        self
    }

    /// Write `version` for `kind` instead of the newest registered one.
    pub fn write_version(mut self, kind: SectionKind, version: SectionVersion) -> Self {
        self.pinned.insert(kind, version);
        self
    }

    /// Reject duplicates, versions that do not start at 1 or skip a number, and pins to
    /// unregistered versions.
    pub fn build(self) -> Result<VersionRegistry> {
        let mut codecs: BTreeMap<(SectionKind, SectionVersion), Box<dyn SectionCodec>> = BTreeMap::new();
        for codec in self.codecs {
            let key = (codec.kind(), codec.version());
            if codecs.contains_key(&key) {
                return Err(CaptureError::InvalidConfig(format!(
                    "duplicate codec for {} v{}",
                    key.0, key.1
                )));
            }
            codecs.insert(key, codec);
        }

        let mut write_versions = BTreeMap::new();
        for kind in SectionKind::ALL {
            let versions: Vec<SectionVersion> = codecs
                .range((kind, SectionVersion::MIN)..=(kind, SectionVersion::MAX))
                .map(|((_, v), _)| *v)
                .collect();
            if versions.is_empty() {
                continue;
            }
            for (expected, actual) in (1..).zip(versions.iter()) {
                if *actual != expected {
                    return Err(CaptureError::InvalidConfig(format!(
                        "{} versions must be numbered 1..=N without gaps, found v{} where v{} was expected",
                        kind, actual, expected
                    )));
                }
            }
            let newest = versions[versions.len() - 1];
            write_versions.insert(kind, newest);
        }

        for (kind, version) in self.pinned {
            if !codecs.contains_key(&(kind, version)) {
                return Err(CaptureError::InvalidConfig(format!(
                    "cannot write {} v{}: no such codec registered",
                    kind, version
                )));
            }
            write_versions.insert(kind, version);
        }

        Ok(VersionRegistry {
            codecs,
            write_versions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use crate::version::{KEVT_SEC_V1, KEVT_SEC_V2, PE_SEC_V1};

    #[test]
    fn builtin_table_is_consistent() {
        let reg = VersionRegistry::try_builtin().unwrap();
        for kind in SectionKind::ALL {
            assert!(reg.current_version(kind).is_some(), "{} has no codec", kind);
        }
    }

    #[test]
    fn builtin_writes_newest_versions() {
        let reg = VersionRegistry::builtin();
        assert_eq!(reg.current_version(SectionKind::KernelEvent), Some(KEVT_SEC_V2));
        assert_eq!(reg.current_version(SectionKind::Pe), Some(PE_SEC_V1));
        assert_eq!(reg.versions(SectionKind::KernelEvent), vec![KEVT_SEC_V1, KEVT_SEC_V2]);
        assert_eq!(reg.kinds(), SectionKind::ALL.to_vec());
    }

    #[test]
    fn decoder_distinguishes_unknown_kind_and_version() {
        let reg = VersionRegistry::builtin();
        assert!(reg.decoder(SectionKind::Handle.id(), 1, 0).is_ok());

        let err = reg.decoder(0x4242, 1, 77).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::UnknownKind);
        assert_eq!(err.offset(), Some(77));

        let err = reg.decoder(SectionKind::Handle.id(), 9, 15).err().unwrap();
        match err {
            CaptureError::UnsupportedVersion { kind, version, max, .. } => {
                assert_eq!(kind, SectionKind::Handle);
                assert_eq!(version, 9);
                assert_eq!(max, 1);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn builder_rejects_duplicates_and_gaps() {
        let dup = RegistryBuilder::new()
            .register(Box::new(PeCodecV1))
            .register(Box::new(PeCodecV1))
            .build();
        assert!(matches!(dup, Err(CaptureError::InvalidConfig(_))));

        // v2 without v1 is a skipped version.
        let gap = RegistryBuilder::new().register(Box::new(KevtCodecV2)).build();
        assert!(matches!(gap, Err(CaptureError::InvalidConfig(_))));
    }

    #[test]
    fn builder_pins_write_version() {
        let reg = RegistryBuilder::new()
            .register(Box::new(KevtCodecV1))
            .register(Box::new(KevtCodecV2))
            .write_version(SectionKind::KernelEvent, KEVT_SEC_V1)
            .build()
            .unwrap();
        assert_eq!(reg.current_version(SectionKind::KernelEvent), Some(KEVT_SEC_V1));
        assert_eq!(reg.max_version(SectionKind::KernelEvent), Some(KEVT_SEC_V2));
        assert!(reg.encoder(SectionKind::Process).is_err());

        let bad_pin = RegistryBuilder::new()
            .register(Box::new(HandleCodecV1))
            .write_version(SectionKind::Handle, 3)
            .build();
        assert!(bad_pin.is_err());
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VersionRegistry>();
    }
}
