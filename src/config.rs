//! Configuration for listing and mirroring
//!
//! Values come from an optional TOML file and are then overridden by
//! command-line flags.
//!
//! # Example strace-tree.toml
//!
//! ```toml
//! output_root = "tree"
//! link_name = "strace"
//! args_width = 64
//! indent_width = 2
//! pid_pattern = '^trace\.(?P<pid>\d+)$'
//! ```

use crate::error::{Result, TreeError};
use crate::pid::{DottedSuffix, PatternPid, PidExtractor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Listing and mirror settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeConfig {
    /// Directory under which the process tree is mirrored
    pub output_root: PathBuf,
    /// Name of the hard link placed in each process directory
    pub link_name: String,
    /// Maximum number of argument characters shown per process
    pub args_width: usize,
    /// Spaces of indentation per tree level
    pub indent_width: usize,
    /// Regex used to find the pid in a trace file name.
    ///
    /// `None` means `<prefix>.<pid>` as written by `strace -ff -o <prefix>`.
    pub pid_pattern: Option<String>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("tree"),
            link_name: "strace".to_string(),
            args_width: 64,
            indent_width: 2,
            pid_pattern: None,
        }
    }
}

impl TreeConfig {
    /// Load configuration from a TOML file; missing keys take default values
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TreeError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|message| TreeError::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    fn from_toml(content: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings that would place links outside their process directory
    pub fn validate(&self) -> Result<()> {
        self.check().map_err(TreeError::InvalidSetting)
    }

    fn check(&self) -> std::result::Result<(), String> {
        let name = self.link_name.as_str();
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            return Err(format!("link_name must be a plain file name, got {:?}", name));
        }
        Ok(())
    }

    /// Pid extractor for the configured file naming convention
    pub fn pid_extractor(&self) -> Result<Box<dyn PidExtractor>> {
        Ok(match &self.pid_pattern {
            Some(pattern) => Box::new(PatternPid::new(pattern)?),
            None => Box::new(DottedSuffix),
        })
    }
}
