//! Pid extraction from trace file names
//!
//! `strace -ff -o <prefix>` writes one file per process named `<prefix>.<pid>`.
//! Other capture tools use other conventions, so the mapping from a file name to
//! a pid is a trait with a default implementation for the strace layout and a
//! regex-driven one for everything else.

use crate::error::Result;
use regex::Regex;
use std::path::Path;

/// Maps a trace file path to the pid of the process it traces
pub trait PidExtractor {
    /// Returns `None` when the file name does not carry a pid
    fn pid_for(&self, path: &Path) -> Option<u32>;
}

/// `<prefix>.<pid>`: the numeric component after the last `.` of the file name
#[derive(Debug, Clone, Copy, Default)]
pub struct DottedSuffix;

impl PidExtractor for DottedSuffix {
    fn pid_for(&self, path: &Path) -> Option<u32> {
        let name = path.file_name()?.to_str()?;
        let (_, suffix) = name.rsplit_once('.')?;
        suffix.parse().ok()
    }
}

/// Pid taken from a regex match against the file name.
///
/// The capture group named `pid` is used when present, otherwise the first
/// capture group.
#[derive(Debug, Clone)]
pub struct PatternPid {
    pattern: Regex,
}

impl PatternPid {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl PidExtractor for PatternPid {
    fn pid_for(&self, path: &Path) -> Option<u32> {
        let name = path.file_name()?.to_str()?;
        let caps = self.pattern.captures(name)?;
        let pid = caps.name("pid").or_else(|| caps.get(1))?;
        pid.as_str().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_suffix_strace_layout() {
        assert_eq!(DottedSuffix.pid_for(Path::new("trace.100")), Some(100));
        assert_eq!(DottedSuffix.pid_for(Path::new("/tmp/out/trace.4242")), Some(4242));
    }

    #[test]
    fn test_dotted_suffix_ignores_dots_in_directories() {
        assert_eq!(DottedSuffix.pid_for(Path::new("run.3/trace.17")), Some(17));
        assert_eq!(DottedSuffix.pid_for(Path::new("run.3/trace")), None);
    }

    #[test]
    fn test_dotted_suffix_uses_last_component() {
        assert_eq!(DottedSuffix.pid_for(Path::new("build.log.991")), Some(991));
    }

    #[test]
    fn test_dotted_suffix_rejects_non_numeric() {
        assert_eq!(DottedSuffix.pid_for(Path::new("trace.abc")), None);
        assert_eq!(DottedSuffix.pid_for(Path::new("trace.-5")), None);
        assert_eq!(DottedSuffix.pid_for(Path::new("trace.")), None);
        assert_eq!(DottedSuffix.pid_for(Path::new("trace")), None);
    }

    #[test]
    fn test_pattern_named_group() {
        let pids = PatternPid::new(r"^strace-(?P<pid>\d+)\.log$").unwrap();
        assert_eq!(pids.pid_for(Path::new("logs/strace-77.log")), Some(77));
        assert_eq!(pids.pid_for(Path::new("logs/strace-77.txt")), None);
    }

    #[test]
    fn test_pattern_first_group() {
        let pids = PatternPid::new(r"(\d+)_trace").unwrap();
        assert_eq!(pids.pid_for(Path::new("123_trace")), Some(123));
    }

    #[test]
    fn test_pattern_without_group_yields_none() {
        let pids = PatternPid::new(r"\d+").unwrap();
        assert_eq!(pids.pid_for(Path::new("trace.5")), None);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternPid::new("(unclosed").is_err());
    }
}
