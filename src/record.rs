//! Per-process facts extracted from one trace file

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// A successful `execve` observed in a trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecImage {
    /// Path of the loaded program (first execve argument)
    pub path: String,
    /// argv[0] as the process reported it
    pub name: String,
    /// Raw argument list text, `"<name>"` followed by the rest of the list verbatim
    pub argv: String,
}

impl ExecImage {
    /// Final path component of the executed program
    pub fn path_basename(&self) -> &str {
        basename(&self.path)
    }

    /// Final path component of argv[0]
    pub fn name_basename(&self) -> &str {
        basename(&self.name)
    }
}

/// Display identity for a process whose trace never shows an exec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticLabel {
    /// Spawned by another traced process but never exec'd
    Clone,
    /// Not spawned by any traced process and never exec'd
    Init,
}

impl SyntheticLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::Init => "init",
        }
    }
}

impl fmt::Display for SyntheticLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything known about one traced process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub pid: u32,
    /// Trace file this record was read from
    pub source: PathBuf,
    /// First successful exec; once set it is never replaced
    pub exec: Option<ExecImage>,
    /// Number of successful exec lines seen, including the first
    pub exec_count: usize,
    /// Pids returned by successful clone/vfork calls
    pub spawned: BTreeSet<u32>,
    /// Spawned pids that have their own record, filled in by the forest builder
    pub children: BTreeSet<u32>,
    /// Set by the forest builder when `exec` is absent
    pub label: Option<SyntheticLabel>,
}

impl TraceRecord {
    pub fn new(pid: u32, source: impl Into<PathBuf>) -> Self {
        Self {
            pid,
            source: source.into(),
            exec: None,
            exec_count: 0,
            spawned: BTreeSet::new(),
            children: BTreeSet::new(),
            label: None,
        }
    }

    /// Whether an exec has already been captured
    pub fn is_resolved(&self) -> bool {
        self.exec.is_some()
    }

    /// Record a successful exec. Only the first one is kept.
    pub fn record_exec(&mut self, image: ExecImage) {
        self.exec_count += 1;
        if self.exec.is_none() {
            self.exec = Some(image);
        }
    }

    /// Record a pid returned by clone/vfork
    pub fn record_spawn(&mut self, pid: u32) {
        self.spawned.insert(pid);
    }

    /// Short name used in listings and mirror directory names.
    ///
    /// Executed processes use the basename of the executed path. Un-executed
    /// processes use their synthetic label once the forest has been built, and
    /// `None` before that.
    pub fn short_name(&self) -> Option<&str> {
        match (&self.exec, self.label) {
            (Some(image), _) => Some(image.path_basename()),
            (None, Some(label)) => Some(label.as_str()),
            (None, None) => None,
        }
    }
}

/// Python-style basename: everything after the last `/`
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
