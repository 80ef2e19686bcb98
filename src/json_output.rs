//! JSON output format for process forests

use crate::forest::Forest;
use crate::record::{SyntheticLabel, TraceRecord};
use serde::{Deserialize, Serialize};

/// A single process and its descendants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonProcess {
    pub pid: u32,
    /// Trace file the process was read from
    pub source: String,
    /// Basename of the executed program, or the synthetic label
    pub name: String,
    /// Full path of the first executed program
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    /// argv[0] as reported by the process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Final path component of argv[0]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_basename: Option<String>,
    /// Raw argument list of the first exec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<SyntheticLabel>,
    /// Successful execs seen in the trace
    pub exec_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<JsonProcess>,
}

/// Complete forest output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonForest {
    pub version: String,
    pub total_processes: usize,
    pub roots: Vec<JsonProcess>,
}

impl JsonForest {
    pub fn from_forest(forest: &Forest) -> Self {
        // Open processes along the current walk path, innermost last
        let mut open: Vec<JsonProcess> = Vec::new();
        let mut roots = Vec::new();

        forest.walk(|record, depth| {
            close_to(&mut open, &mut roots, depth);
            open.push(process(record));
        });
        close_to(&mut open, &mut roots, 0);

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            total_processes: forest.len(),
            roots,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Pop finished processes until `depth` remain, attaching each to its parent
fn close_to(open: &mut Vec<JsonProcess>, roots: &mut Vec<JsonProcess>, depth: usize) {
    while open.len() > depth {
        let Some(done) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}

fn process(record: &TraceRecord) -> JsonProcess {
    let exec = record.exec.as_ref();
    JsonProcess {
        pid: record.pid,
        source: record.source.display().to_string(),
        name: record.short_name().unwrap_or_default().to_string(),
        executable: exec.map(|e| e.path.clone()),
        display_name: exec.map(|e| e.name.clone()),
        display_basename: exec.map(|e| e.name_basename().to_string()),
        argv: exec.map(|e| e.argv.clone()),
        label: record.label,
        exec_count: record.exec_count,
        children: Vec::new(),
    }
}
