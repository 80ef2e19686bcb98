//! strace-tree - organise `strace -ff` output into a tree of subprocesses
//!
//! `strace -ff -o <prefix>` writes one trace file per process. This library reads
//! those files, works out which process spawned which, and presents the result
//! as an indented listing, as JSON, or as a mirrored directory tree of hard
//! links back to the original traces.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod forest;
pub mod json_output;
pub mod mirror;
pub mod pid;
pub mod record;
pub mod render;

pub use error::{Result, TreeError};
pub use forest::Forest;
pub use record::{ExecImage, SyntheticLabel, TraceRecord};
