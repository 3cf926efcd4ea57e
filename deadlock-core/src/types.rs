//! Shared data model (spec.md §3).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type Pid = u32;
pub type Rid = u64;

/// Which kernel object kind a resource vertex was synthesized from. Not used
/// to widen the RID space (the collision profile of `inode % 1_000_000` is
/// preserved for compatibility, see `SPEC_FULL.md`), only to let a caller
/// disambiguate two resources that happen to share a numeric RID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Lock,
    Pipe,
}

/// A record parsed from `/proc/locks` or `/proc/<pid>/locks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemLock {
    pub id: u64,
    /// `'F'` for flock, `'P'` for POSIX/advisory.
    pub kind: char,
    pub pid: Pid,
    pub inode: u64,
    pub start: u64,
    pub end: u64,
    pub is_blocking: bool,
}

/// A lock this process holds, with a human-readable label for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldLock {
    pub rid: Rid,
    pub label: String,
}

/// Single-letter process state codes as reported by `/proc/<pid>/status`.
pub type ProcessState = char;

/// Fields extracted from `/proc/<pid>/status` (spec.md §4.2: "only Name,
/// State, PPid, Uid, Gid, VmRSS, Threads are extracted"). Carried on the
/// snapshot purely for display — the dependency extractor and classifier
/// never read it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessMeta {
    pub name: String,
    pub state: Option<ProcessState>,
    pub ppid: Option<Pid>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub vm_rss_kb: Option<u64>,
    pub threads: Option<u32>,
}

/// Per-live-pid observation produced by the snapshot builder (spec.md §4.2).
#[derive(Debug, Clone, Default)]
pub struct ProcSnapshot {
    pub pid: Pid,
    pub wchan: String,
    pub held_locks: Vec<HeldLock>,
    pub pipe_inodes: HashSet<u64>,
    pub blocked_on_pipe: bool,
    pub blocked_on_lock: bool,
    pub open_fds: Vec<i32>,
    pub meta: Option<ProcessMeta>,
    /// Raw cmdline, ambient enrichment only (SPEC_FULL.md), never consulted
    /// by the dependency extractor or classifier.
    pub cmdline: Option<String>,
}

/// Dependency-extractor output for one pid (spec.md §4.3).
///
/// Invariant: callers must not assume `held` and `waited_for` are disjoint —
/// the kernel may legitimately report a process that holds one instance of a
/// resource while awaiting another instance of the *same* resource id.
#[derive(Debug, Clone, Default)]
pub struct ProcessResourceInfo {
    pub pid: Pid,
    pub held: Vec<Rid>,
    pub waited_for: Vec<Rid>,
    pub waiting_on_pids: Vec<Pid>,
    pub blocked_on_pipe: bool,
    pub blocked_on_lock: bool,
}

impl ProcessResourceInfo {
    pub fn new(pid: Pid, blocked_on_pipe: bool, blocked_on_lock: bool) -> Self {
        ProcessResourceInfo {
            pid,
            held: Vec::new(),
            waited_for: Vec::new(),
            waiting_on_pids: Vec::new(),
            blocked_on_pipe,
            blocked_on_lock,
        }
    }
}

/// Kind of a RAG vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexKind {
    Process,
    Resource,
}

/// An elementary cycle, canonicalized so `v0 == vn` and rotation-equal
/// cycles compare equal once run through [`crate::cycles::canonicalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleInfo {
    /// `v0, v1, …, vn` with `v0 == vn`, expressed as `(kind, id)` pairs so the
    /// cycle remains meaningful after the RAG that produced it is dropped.
    pub vertices: Vec<(VertexKind, u64)>,
}

impl CycleInfo {
    /// Vertices with the closing duplicate removed.
    pub fn non_closing(&self) -> &[(VertexKind, u64)] {
        &self.vertices[..self.vertices.len().saturating_sub(1)]
    }

    pub fn len_excluding_close(&self) -> usize {
        self.non_closing().len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeadlockKind {
    Definite,
    Potential,
}

/// A single reported cycle, classified and explained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedCycle {
    pub cycle: CycleInfo,
    pub kind: DeadlockKind,
    pub explanation: String,
    /// Diagnostic only (SPEC_FULL.md, grounded on deloxide's
    /// `filter_cycle_by_common_locks`): set when every process in the cycle
    /// also holds some resource outside the cycle in common. Never used to
    /// suppress or reclassify a cycle — the definite/potential split and
    /// `deadlock_detected` are decided purely from resource instance counts.
    pub shared_resource_note: Option<String>,
}

/// Final product of one detection pass (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlockReport {
    pub deadlock_detected: bool,
    pub deadlocked_pids: Vec<Pid>,
    pub cycles: Vec<ReportedCycle>,
    pub recommendations: Vec<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub total_processes_scanned: usize,
    pub total_resources_found: usize,
}
