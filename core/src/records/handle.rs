use serde::{Deserialize, Serialize};

/// An open kernel object handle owned by a process.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Handle {
    /// Handle value inside the owning process.
    pub num: u64,
    /// Kernel address of the referenced object.
    pub object: u64,
    pub pid: u32,
    /// Object type name (File, Key, Mutant, ...).
    pub handle_type: String,
    pub name: String,
}
