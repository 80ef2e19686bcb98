//! Mirror a process forest as nested directories of hard links
//!
//! Every process becomes a directory named `<pid>.<name>` inside its parent's
//! directory, holding a hard link back to its trace file:
//!
//! ```text
//! tree/
//! └── 100.sh/
//!     ├── strace -> trace.100
//!     └── 101.clone/
//!         └── strace -> trace.101
//! ```
//!
//! Re-running over an existing mirror is a no-op: existing directories and
//! links are left alone.

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::forest::Forest;
use crate::record::TraceRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem operations needed to build the mirror
pub trait TreeFs {
    /// Create a directory and its parents; succeeds if it already exists
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn hard_link(&mut self, original: &Path, link: &Path) -> io::Result<()>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl TreeFs for HostFs {
    fn create_dir_all(&mut self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        // symlink_metadata so a dangling link still counts as present
        fs::symlink_metadata(path).is_ok()
    }

    fn hard_link(&mut self, original: &Path, link: &Path) -> io::Result<()> {
        fs::hard_link(original, link)
    }
}

/// Counts of what a mirror run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    pub directories: usize,
    pub links_created: usize,
    pub links_existing: usize,
}

/// Directory name for a process, `<pid>.<basename-or-label>`
pub fn directory_name(record: &TraceRecord) -> String {
    format!("{}.{}", record.pid, record.short_name().unwrap_or_default())
}

/// Build the mirror under `config.output_root`.
///
/// A process claimed by several parents gets a directory under each of them.
pub fn mirror<F: TreeFs>(forest: &Forest, config: &TreeConfig, fs: &mut F) -> Result<MirrorSummary> {
    let mut summary = MirrorSummary::default();
    // Directories of the processes on the current walk path
    let mut dirs: Vec<PathBuf> = Vec::new();

    forest.try_walk(|record, depth| {
        dirs.truncate(depth);
        let parent = dirs.last().unwrap_or(&config.output_root);
        let dir = parent.join(directory_name(record));
        fs.create_dir_all(&dir).map_err(mirror_error(&dir))?;
        summary.directories += 1;

        let link = dir.join(&config.link_name);
        if fs.exists(&link) {
            tracing::debug!(link = %link.display(), "link already present");
            summary.links_existing += 1;
        } else {
            fs.hard_link(&record.source, &link).map_err(mirror_error(&link))?;
            summary.links_created += 1;
        }

        dirs.push(dir);
        Ok::<(), TreeError>(())
    })?;

    tracing::info!(
        root = %config.output_root.display(),
        directories = summary.directories,
        links_created = summary.links_created,
        links_existing = summary.links_existing,
        "mirrored process tree"
    );

    Ok(summary)
}

fn mirror_error(path: &Path) -> impl FnOnce(io::Error) -> TreeError {
    let path: PathBuf = path.to_path_buf();
    move |source| TreeError::Mirror { path, source }
}
