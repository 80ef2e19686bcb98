//! Process forest construction
//!
//! Each trace only knows which pids it spawned. The forest inverts that: it
//! links every record to the records of its spawned pids and picks out the
//! roots, the processes no traced process claims to have spawned.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use strace_tree::forest::Forest;
//! use strace_tree::record::{SyntheticLabel, TraceRecord};
//!
//! let mut parent = TraceRecord::new(100, "trace.100");
//! parent.record_spawn(101);
//! let child = TraceRecord::new(101, "trace.101");
//!
//! let forest = Forest::build(BTreeMap::from([(100, parent), (101, child)]));
//! let roots: Vec<u32> = forest.roots().map(|r| r.pid).collect();
//!
//! assert_eq!(roots, vec![100]);
//! assert_eq!(forest.get(101).unwrap().label, Some(SyntheticLabel::Clone));
//! ```

use crate::record::{SyntheticLabel, TraceRecord};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

/// All trace records with parent/child links resolved
#[derive(Debug, Clone, Default)]
pub struct Forest {
    records: BTreeMap<u32, TraceRecord>,
    roots: BTreeSet<u32>,
}

impl Forest {
    /// Link records to their children, label un-executed processes and find
    /// the roots. Never fails: spawned pids without a record are dropped.
    pub fn build(mut records: BTreeMap<u32, TraceRecord>) -> Self {
        let all_spawned: BTreeSet<u32> = records
            .values()
            .flat_map(|r| r.spawned.iter().copied())
            .collect();

        let known: BTreeSet<u32> = records.keys().copied().collect();

        for record in records.values_mut() {
            record.children = record.spawned.intersection(&known).copied().collect();

            for dangling in record.spawned.difference(&known) {
                tracing::debug!(parent = record.pid, pid = dangling, "no trace for spawned pid");
            }

            if !record.is_resolved() {
                record.label = Some(if all_spawned.contains(&record.pid) {
                    SyntheticLabel::Clone
                } else {
                    SyntheticLabel::Init
                });
            }
        }

        let roots: BTreeSet<u32> = known.difference(&all_spawned).copied().collect();

        tracing::info!(records = records.len(), roots = roots.len(), "built process forest");

        Self { records, roots }
    }

    /// Root records in ascending pid order
    pub fn roots(&self) -> impl Iterator<Item = &TraceRecord> {
        self.roots.iter().filter_map(|pid| self.records.get(pid))
    }

    pub fn is_root(&self, pid: u32) -> bool {
        self.roots.contains(&pid)
    }

    pub fn get(&self, pid: u32) -> Option<&TraceRecord> {
        self.records.get(&pid)
    }

    /// Every record, in ascending pid order
    pub fn records(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Depth-first walk from every root.
    ///
    /// `visit` receives each record with its depth. A pid claimed by several
    /// parents is visited under each of them. A pid that is already one of its
    /// own ancestors is skipped, so cyclic spawn claims from corrupt traces
    /// terminate. The walk keeps its own stack and does not recurse.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&TraceRecord, usize),
    {
        let _ = self.try_walk::<Infallible, _>(|record, depth| {
            visit(record, depth);
            Ok(())
        });
    }

    /// Like [`Forest::walk`], stopping at the first error returned by `visit`
    pub fn try_walk<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&TraceRecord, usize) -> Result<(), E>,
    {
        let mut ancestors = BTreeSet::new();
        let mut stack: Vec<Step> = self.roots.iter().rev().map(|&pid| Step::Enter(pid, 0)).collect();

        while let Some(step) = stack.pop() {
            let (pid, depth) = match step {
                Step::Enter(pid, depth) => (pid, depth),
                Step::Leave(pid) => {
                    ancestors.remove(&pid);
                    continue;
                }
            };
            let Some(record) = self.records.get(&pid) else {
                continue;
            };
            if !ancestors.insert(pid) {
                tracing::warn!(pid, depth, "process is its own ancestor, spawn cycle in traces");
                continue;
            }

            visit(record, depth)?;

            stack.push(Step::Leave(pid));
            stack.extend(record.children.iter().rev().map(|&child| Step::Enter(child, depth + 1)));
        }

        Ok(())
    }
}

/// Pending work for [`Forest::try_walk`]
enum Step {
    Enter(u32, usize),
    Leave(u32),
}
