//! Builds a [`ProcSnapshot`] for each live pid (spec.md §4.2).
//!
//! One `parse_x_content(&str)` pure function per `/proc` file, separated
//! from the `fs`-touching wrapper around it, in the style of
//! `examples/other_examples/…process_triage…proc_parsers.rs.rs`.

use crate::proc_reader::{parse_locks_content, ProcReader};
use crate::types::{HeldLock, Pid, ProcSnapshot, ProcessMeta};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Short-lived cache of raw `status` content keyed by pid. A pure
/// optimization: every value it returns is re-derivable by reading
/// `/proc/<pid>/status` again, so correctness never depends on it being
/// populated or fresh. Owned by the builder, accessed only on the calling
/// thread (spec.md §5).
#[derive(Default)]
pub struct StatusCache {
    entries: RefCell<HashMap<Pid, (Instant, String)>>,
    ttl: Duration,
}

impl StatusCache {
    pub fn new(ttl_seconds: u64) -> Self {
        StatusCache {
            entries: RefCell::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    fn get_or_read(&self, reader: &ProcReader, pid: Pid) -> Option<String> {
        if let Some((fetched, content)) = self.entries.borrow().get(&pid) {
            if fetched.elapsed() < self.ttl {
                return Some(content.clone());
            }
        }
        let path = reader.pid_path(pid, "status");
        let bytes = reader.read_text(&path).ok()?;
        let content = String::from_utf8_lossy(&bytes).into_owned();
        self.entries
            .borrow_mut()
            .insert(pid, (Instant::now(), content.clone()));
        Some(content)
    }
}

pub struct SnapshotBuilder<'a> {
    reader: &'a ProcReader,
    cache: &'a StatusCache,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(reader: &'a ProcReader, cache: &'a StatusCache) -> Self {
        SnapshotBuilder { reader, cache }
    }

    /// Builds one snapshot, or `None` if the process vanished before we
    /// could read enough of its state (NotFound/PermissionDenied on the
    /// files that matter). Partial data (e.g. an unreadable `locks` file)
    /// still yields `Some` with that field left empty, per spec.md §4.2.
    pub fn build(&self, pid: Pid) -> Option<ProcSnapshot> {
        let wchan = self.read_wchan(pid)?;

        let mut snapshot = ProcSnapshot {
            pid,
            wchan: wchan.clone(),
            blocked_on_pipe: wchan.contains("pipe") || wchan.contains("futex"),
            blocked_on_lock: wchan.contains("flock") || wchan.contains("lock"),
            ..Default::default()
        };

        snapshot.meta = self
            .cache
            .get_or_read(self.reader, pid)
            .map(|content| parse_status_content(&content));

        let (open_fds, pipe_inodes) = self.read_fds(pid);
        snapshot.open_fds = open_fds;
        snapshot.pipe_inodes = pipe_inodes;

        snapshot.held_locks = self.read_held_locks(pid);
        snapshot.cmdline = self.read_cmdline(pid);

        Some(snapshot)
    }

    fn read_wchan(&self, pid: Pid) -> Option<String> {
        let path = self.reader.pid_path(pid, "wchan");
        let bytes = self.reader.read_text(&path).ok()?;
        let text = String::from_utf8_lossy(&bytes);
        Some(text.trim_end_matches('\n').to_string())
    }

    fn read_fds(&self, pid: Pid) -> (Vec<i32>, std::collections::HashSet<u64>) {
        let fd_dir = self.reader.pid_path(pid, "fd");
        let mut fds = Vec::new();
        let mut pipe_inodes = std::collections::HashSet::new();

        let Ok(entries) = std::fs::read_dir(&fd_dir) else {
            return (fds, pipe_inodes);
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Ok(fd) = name.parse::<i32>() else { continue };
            fds.push(fd);

            if let Ok(target) = self.reader.read_symlink_target(&entry.path()) {
                if let Some(inode) = parse_pipe_inode(&target) {
                    pipe_inodes.insert(inode);
                }
            }
        }
        (fds, pipe_inodes)
    }

    fn read_held_locks(&self, pid: Pid) -> Vec<HeldLock> {
        let path = self.reader.pid_path(pid, "locks");
        let Ok(bytes) = self.reader.read_text(&path) else {
            return Vec::new();
        };
        let content = String::from_utf8_lossy(&bytes);
        parse_locks_content(&content)
            .into_iter()
            .filter(|lock| lock.pid == pid)
            .map(|lock| HeldLock {
                rid: lock.id,
                label: format!("lock {} ({}..{})", lock.id, lock.start, lock.end),
            })
            .collect()
    }

    fn read_cmdline(&self, pid: Pid) -> Option<String> {
        let path = self.reader.pid_path(pid, "cmdline");
        let bytes = self.reader.read_text(&path).ok()?;
        if bytes.is_empty() {
            return None;
        }
        let joined = bytes
            .split(|&b| b == 0)
            .filter(|part| !part.is_empty())
            .map(|part| String::from_utf8_lossy(part).into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

/// Extracts `<decimal>` from a `pipe:[<decimal>]` fd symlink target.
pub(crate) fn parse_pipe_inode(target: &str) -> Option<u64> {
    let inner = target.strip_prefix("pipe:[")?.strip_suffix(']')?;
    inner.parse().ok()
}

/// Parses `/proc/<pid>/status` content. Unknown keys are ignored.
pub(crate) fn parse_status_content(content: &str) -> ProcessMeta {
    let mut meta = ProcessMeta::default();
    for line in content.lines() {
        let Some(colon) = line.find(':') else { continue };
        let key = line[..colon].trim();
        let value = line[colon + 1..].trim();

        match key {
            "Name" => meta.name = value.to_string(),
            "State" => meta.state = value.chars().next(),
            "PPid" => meta.ppid = value.parse().ok(),
            "Uid" => meta.uid = value.split_whitespace().next().and_then(|v| v.parse().ok()),
            "Gid" => meta.gid = value.split_whitespace().next().and_then(|v| v.parse().ok()),
            "VmRSS" => {
                meta.vm_rss_kb = value.split_whitespace().next().and_then(|v| v.parse().ok())
            }
            "Threads" => meta.threads = value.parse().ok(),
            _ => {}
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pipe_inode() {
        assert_eq!(parse_pipe_inode("pipe:[12345]"), Some(12345));
        assert_eq!(parse_pipe_inode("socket:[999]"), None);
        assert_eq!(parse_pipe_inode("/tmp/foo"), None);
    }

    #[test]
    fn parses_status_fields() {
        let content = "Name:\tbash\nState:\tS (sleeping)\nPPid:\t100\nUid:\t1000\t1000\t1000\t1000\nGid:\t1000\t1000\t1000\t1000\nVmRSS:\t4096 kB\nThreads:\t3\nUnknownKey:\tirrelevant\n";
        let meta = parse_status_content(content);
        assert_eq!(meta.name, "bash");
        assert_eq!(meta.state, Some('S'));
        assert_eq!(meta.ppid, Some(100));
        assert_eq!(meta.uid, Some(1000));
        assert_eq!(meta.gid, Some(1000));
        assert_eq!(meta.vm_rss_kb, Some(4096));
        assert_eq!(meta.threads, Some(3));
    }

    #[test]
    fn wchan_classifies_pipe_and_futex() {
        assert!("pipe_wait".contains("pipe"));
        assert!("futex_wait_queue_me".contains("futex"));
    }
}
