use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Process state captured at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub cmdline: String,
    pub exe: String,
    pub cwd: String,
    pub sid: String,
    pub session_id: u32,
    pub args: Vec<String>,
    pub envs: BTreeMap<String, String>,
}
