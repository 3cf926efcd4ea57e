//! Reads text files under `/proc/<pid>/` and `/proc/locks`.
//!
//! Owns no state beyond the short-lived per-pass status cache in
//! [`crate::snapshot`]. Every method here treats `NotFound` as "the pid has
//! no more data" rather than a pass-wide failure — a process can legitimately
//! disappear between `list_pids` and the read that follows it.

use crate::error::ProcReadError;
use crate::types::{Pid, SystemLock};
use std::fs;
use std::path::{Path, PathBuf};

/// Root of the `/proc` hierarchy. A constant rather than a config knob: the
/// detector only ever has one kernel to talk to.
const PROC_ROOT: &str = "/proc";

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcReader;

impl ProcReader {
    pub fn new() -> Self {
        ProcReader
    }

    /// Enumerates the immediate children of `/proc` whose names are entirely
    /// decimal digits with a positive integer value. Ordering is not
    /// guaranteed.
    pub fn list_pids(&self) -> Vec<Pid> {
        let entries = match fs::read_dir(PROC_ROOT) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut pids = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if let Ok(pid) = name.parse::<u32>() {
                if pid > 0 {
                    pids.push(pid);
                }
            }
        }
        pids
    }

    /// Reads a `/proc` path as raw bytes. `NotFound`/`PermissionDenied` are
    /// normal outcomes for a racing process and are returned, not panicked
    /// on, so callers can drop the affected snapshot silently.
    pub(crate) fn read_text(&self, path: &Path) -> Result<Vec<u8>, ProcReadError> {
        fs::read(path).map_err(ProcReadError::from)
    }

    pub(crate) fn read_symlink_target(&self, path: &Path) -> Result<String, ProcReadError> {
        let target = fs::read_link(path)?;
        target
            .to_str()
            .map(str::to_owned)
            .ok_or(ProcReadError::ParseError)
    }

    pub fn pid_path(&self, pid: Pid, rel: &str) -> PathBuf {
        Path::new(PROC_ROOT).join(pid.to_string()).join(rel)
    }

    /// Parses `/proc/locks`. Each line has fields
    /// `id: kind advisory rw pid maj:min:inode start end`. Lines that fail to
    /// yield the first five fields are skipped silently, per spec.
    pub fn parse_system_locks(&self) -> Vec<SystemLock> {
        let content = match fs::read_to_string(Path::new(PROC_ROOT).join("locks")) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };
        parse_locks_content(&content)
    }
}

/// Parses the content of `/proc/locks` or `/proc/<pid>/locks` (same format).
/// Exposed as a pure function so it can be exercised without a real `/proc`.
pub(crate) fn parse_locks_content(content: &str) -> Vec<SystemLock> {
    let mut locks = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        // id: kind advisory rw pid maj:min:inode start end
        if fields.len() < 5 {
            continue;
        }

        let Some(id_str) = fields[0].strip_suffix(':') else {
            continue;
        };
        let Ok(id) = id_str.parse::<u64>() else {
            continue;
        };
        let kind_word = fields[1];
        let kind = kind_word.chars().next().unwrap_or('P');
        let kind = if kind == 'F' { 'F' } else { 'P' };

        let rw = fields[3];
        let is_blocking = rw == "WRITE";

        let Ok(pid) = fields[4].parse::<u32>() else {
            continue;
        };

        let mut inode = 0u64;
        if let Some(loc) = fields.get(5) {
            // maj:min:inode
            if let Some(inode_str) = loc.rsplit(':').next() {
                inode = inode_str.parse().unwrap_or(0);
            }
        }

        let start = fields.get(6).and_then(|s| s.parse().ok()).unwrap_or(0);
        let end = fields.get(7).and_then(|s| s.parse().ok()).unwrap_or(0);

        locks.push(SystemLock {
            id,
            kind,
            pid,
            inode,
            start,
            end,
            is_blocking,
        });
    }
    locks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_lock_line() {
        let content = "1: POSIX  ADVISORY  WRITE 1001 08:01:12345 0 EOF\n";
        let locks = parse_locks_content(content);
        assert_eq!(locks.len(), 1);
        assert_eq!(locks[0].id, 1);
        assert_eq!(locks[0].kind, 'P');
        assert_eq!(locks[0].pid, 1001);
        assert_eq!(locks[0].inode, 12345);
        assert!(locks[0].is_blocking);
    }

    #[test]
    fn flock_kind_is_tagged_f() {
        let content = "2: FLOCK  ADVISORY  READ  2002 08:01:999 0 0\n";
        let locks = parse_locks_content(content);
        assert_eq!(locks[0].kind, 'F');
        assert!(!locks[0].is_blocking);
    }

    #[test]
    fn skips_short_lines() {
        let content = "garbage\n1: POSIX\n";
        assert!(parse_locks_content(content).is_empty());
    }

    #[test]
    fn unparseable_end_offset_defaults_to_zero() {
        let content = "3: POSIX ADVISORY WRITE 55 08:01:7 0 EOF\n";
        let locks = parse_locks_content(content);
        assert_eq!(locks[0].end, 0);
    }

    #[test]
    fn list_pids_filters_non_numeric_entries() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1", "42", "self", "net", "007", "-5"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let mut pids = Vec::new();
        for entry in std::fs::read_dir(dir.path()).unwrap().flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            if let Ok(pid) = name.parse::<u32>() {
                if pid > 0 {
                    pids.push(pid);
                }
            }
        }
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 7, 42]);
    }
}
