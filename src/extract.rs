//! Trace record extraction
//!
//! Scans one `strace -ff` output file and keeps two kinds of lines:
//! - successful `execve(...) = 0`, which names the process
//! - successful `clone(...)`/`vfork(...)` returning a new pid
//!
//! Everything else is ignored. Traces are often cut short when the tracer is
//! interrupted, so unrecognized or truncated lines are never an error.

use crate::error::{Result, TreeError};
use crate::pid::PidExtractor;
use crate::record::{ExecImage, TraceRecord};
use regex::Regex;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Optional `[pid N]` marker followed by an optional timestamp or tid token
const PREFIX: &str = r"^(?:\[pid\s+\d+\]\s+)?(?:\S+\s+)?";

/// Optional `<seconds>` suffix written by `strace -T`
const DURATION: &str = r"(?:\s+<[0-9.]+>)?$";

static EXECVE: LazyLock<Regex> = LazyLock::new(|| {
    let quoted = r#"(?:[^"\\]|\\.)"#;
    let pattern = format!(
        r#"{PREFIX}execve\("(?P<exec>{q}+)", \["(?P<name>{q}*)"(?P<args>(?:\.\.\.)?(?:, "{q}*"(?:\.\.\.)?)*(?:, \.\.\.)?)\].*\)\s*= 0{DURATION}"#,
        q = quoted,
    );
    Regex::new(&pattern).expect("execve pattern is valid")
});

static SPAWN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"{PREFIX}(?:clone|vfork)\(.*\)\s*= (?P<pid>[0-9]+){DURATION}");
    Regex::new(&pattern).expect("spawn pattern is valid")
});

/// A recognized trace line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Exec(ExecImage),
    Spawn(u32),
}

/// Classify a single trace line, returning `None` for anything not recognized
pub fn parse_line(line: &str) -> Option<TraceEvent> {
    let line = line.trim();

    if let Some(caps) = EXECVE.captures(line) {
        let name = &caps["name"];
        return Some(TraceEvent::Exec(ExecImage {
            path: caps["exec"].to_string(),
            name: name.to_string(),
            argv: format!("\"{}\"{}", name, &caps["args"]),
        }));
    }

    let caps = SPAWN.captures(line)?;
    // Pids too large for u32 cannot name a trace file
    caps["pid"].parse().ok().map(TraceEvent::Spawn)
}

/// Build a record from one trace stream.
///
/// `pid` comes from the stream's name, not its content. Invalid UTF-8 is
/// replaced rather than rejected.
pub fn extract<R: BufRead>(reader: R, pid: u32, source: impl Into<PathBuf>) -> io::Result<TraceRecord> {
    let mut record = TraceRecord::new(pid, source);

    for line in reader.split(b'\n') {
        let line = line?;
        match parse_line(&String::from_utf8_lossy(&line)) {
            Some(TraceEvent::Exec(image)) => record.record_exec(image),
            Some(TraceEvent::Spawn(child)) => record.record_spawn(child),
            None => {}
        }
    }

    tracing::debug!(
        pid,
        source = %record.source.display(),
        exec = record.exec.as_ref().map(|e| e.path.as_str()),
        spawned = record.spawned.len(),
        "extracted trace record"
    );

    Ok(record)
}

/// Open and extract a single trace file
pub fn extract_file(path: &Path, pids: &dyn PidExtractor) -> Result<TraceRecord> {
    let pid = pids.pid_for(path).ok_or_else(|| TreeError::MalformedFilename {
        path: path.to_path_buf(),
    })?;

    let unreadable = |source| TreeError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    extract(BufReader::new(file), pid, path).map_err(unreadable)
}

/// Extract every file into a map keyed by pid.
///
/// Files are processed in order; the first failure aborts the whole load so a
/// missing trace never silently turns into a dangling spawn.
pub fn load_records<P: AsRef<Path>>(
    paths: &[P],
    pids: &dyn PidExtractor,
) -> Result<BTreeMap<u32, TraceRecord>> {
    let mut records = BTreeMap::new();

    for path in paths {
        let record = extract_file(path.as_ref(), pids)?;
        match records.entry(record.pid) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(existing) => {
                return Err(TreeError::DuplicatePid {
                    pid: record.pid,
                    first: existing.get().source.clone(),
                    second: record.source,
                });
            }
        }
    }

    Ok(records)
}
