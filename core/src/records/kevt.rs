use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Typed kernel event parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    I64(i64),
    F64(f64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
}

impl ParamValue {
    /// Wire tag. Tags are part of the kevt section layout and never renumbered.
    pub const fn tag(&self) -> u8 {
        match self {
            ParamValue::U8(_) => 1,
            ParamValue::U16(_) => 2,
            ParamValue::U32(_) => 3,
            ParamValue::U64(_) => 4,
            ParamValue::I32(_) => 5,
            ParamValue::I64(_) => 6,
            ParamValue::F64(_) => 7,
            ParamValue::Bool(_) => 8,
            ParamValue::Str(_) => 9,
            ParamValue::Bytes(_) => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: ParamValue,
}

impl Param {
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self { name: name.into(), value }
    }
}

/// A single kernel event as delivered by the acquisition layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KernelEvent {
    pub seq: u64,
    pub pid: u32,
    pub tid: u32,
    pub cpu: u8,
    pub name: String,
    pub category: String,
    pub description: String,
    pub host: String,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    /// Parameters in delivery order.
    pub params: Vec<Param>,
    /// Free-form annotations. Sorted so encoding stays deterministic.
    pub metadata: BTreeMap<String, String>,
}

impl KernelEvent {
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}
