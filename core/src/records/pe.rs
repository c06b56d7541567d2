use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeSection {
    pub name: String,
    pub size: u32,
    pub entropy: f64,
    pub md5: String,
}

/// Portable Executable metadata of a process image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeMetadata {
    pub pid: u32,
    pub nsections: u16,
    pub nsymbols: u32,
    pub image_base: u64,
    pub entry_point: u64,
    pub sections: Vec<PeSection>,
    pub symbols: Vec<String>,
    pub imports: Vec<String>,
    pub version_resources: BTreeMap<String, String>,
}
