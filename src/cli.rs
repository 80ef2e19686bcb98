//! CLI argument parsing for strace-tree

use crate::config::TreeConfig;
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the process listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented text tree (default)
    Text,
    /// Nested JSON for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "strace-tree")]
#[command(version)]
#[command(about = "Organise strace -ff output into a tree of subprocesses", long_about = None)]
pub struct Cli {
    /// Per-process trace files written by `strace -ff -o <prefix>`
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Directory to mirror the process tree into (default: tree)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Do not create the mirrored directory tree
    #[arg(long = "no-mirror")]
    pub no_mirror: bool,

    /// Do not print the process listing
    #[arg(long = "no-print")]
    pub no_print: bool,

    /// Listing format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Regex locating the pid in each file name (first group or group named `pid`)
    #[arg(long = "pid-pattern", value_name = "REGEX")]
    pub pid_pattern: Option<String>,

    /// Name of the hard link created in each process directory (default: strace)
    #[arg(long = "link-name", value_name = "NAME")]
    pub link_name: Option<String>,

    /// Maximum argument characters shown per process (default: 64)
    #[arg(long = "args-width", value_name = "N")]
    pub args_width: Option<usize>,

    /// Read settings from a TOML file; flags take precedence
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of `config` and validate the result
    pub fn apply(&self, mut config: TreeConfig) -> Result<TreeConfig> {
        if let Some(dir) = &self.output_dir {
            config.output_root = dir.clone();
        }
        if let Some(pattern) = &self.pid_pattern {
            config.pid_pattern = Some(pattern.clone());
        }
        if let Some(name) = &self.link_name {
            config.link_name = name.clone();
        }
        if let Some(width) = self.args_width {
            config.args_width = width;
        }
        config.validate()?;
        Ok(config)
    }
}
