//! Error types for loading traces and materializing the tree

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or mirroring a process tree
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Cannot extract a pid from file name: {}", path.display())]
    MalformedFilename { path: PathBuf },

    #[error("Failed to read trace file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Duplicate pid {pid}: both {} and {} claim it",
        first.display(),
        second.display()
    )]
    DuplicatePid {
        pid: u32,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid pid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Failed to mirror {}: {source}", path.display())]
    Mirror {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Result type for process tree operations
pub type Result<T> = std::result::Result<T, TreeError>;
