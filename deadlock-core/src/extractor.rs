//! Cross-references snapshots into held/waited-for relations (spec.md §4.3).

use crate::config::DetectorConfig;
use crate::types::{Pid, ProcSnapshot, ProcessResourceInfo, Rid, SystemLock};
use std::collections::HashMap;

/// The modulus applied to a pipe inode to derive its RID. Preserved verbatim
/// from the source system for compatibility — see SPEC_FULL.md's Open
/// Questions ledger on the resulting collision profile.
const PIPE_RID_MODULUS: u64 = 1_000_000;

fn push_unique<T: PartialEq>(vec: &mut Vec<T>, value: T, cap: usize) {
    if vec.len() >= cap || vec.contains(&value) {
        return;
    }
    vec.push(value);
}

/// Converts one pass's snapshots and system lock table into a
/// [`ProcessResourceInfo`] per snapshot, in input order.
pub fn extract(
    snapshots: &[ProcSnapshot],
    system_locks: &[SystemLock],
    config: &DetectorConfig,
) -> Vec<ProcessResourceInfo> {
    let mut pris: Vec<ProcessResourceInfo> = snapshots
        .iter()
        .map(|s| {
            let mut pri = ProcessResourceInfo::new(s.pid, s.blocked_on_pipe, s.blocked_on_lock);
            for lock in &s.held_locks {
                push_unique(&mut pri.held, lock.rid, config.max_resources_per_process);
            }
            pri
        })
        .collect();

    let mut index_of: HashMap<Pid, usize> = HashMap::new();
    for (i, pri) in pris.iter().enumerate() {
        index_of.insert(pri.pid, i);
    }

    apply_pipe_pairs(snapshots, &index_of, &mut pris, config);
    apply_lock_waits(snapshots, system_locks, &index_of, &mut pris, config);

    pris
}

fn apply_pipe_pairs(
    snapshots: &[ProcSnapshot],
    index_of: &HashMap<Pid, usize>,
    pris: &mut [ProcessResourceInfo],
    config: &DetectorConfig,
) {
    for i in 0..snapshots.len() {
        for j in (i + 1)..snapshots.len() {
            let a = &snapshots[i];
            let b = &snapshots[j];
            let shared: Vec<u64> = a.pipe_inodes.intersection(&b.pipe_inodes).copied().collect();
            for inode in shared {
                let rid = inode % PIPE_RID_MODULUS;
                if a.blocked_on_pipe {
                    apply_pipe_wait(a.pid, b.pid, rid, index_of, pris, config);
                }
                if b.blocked_on_pipe {
                    apply_pipe_wait(b.pid, a.pid, rid, index_of, pris, config);
                }
            }
        }
    }
}

fn apply_pipe_wait(
    waiter: Pid,
    holder: Pid,
    rid: Rid,
    index_of: &HashMap<Pid, usize>,
    pris: &mut [ProcessResourceInfo],
    config: &DetectorConfig,
) {
    if let Some(&wi) = index_of.get(&waiter) {
        push_unique(&mut pris[wi].waited_for, rid, config.max_resources_per_process);
        push_unique(
            &mut pris[wi].waiting_on_pids,
            holder,
            config.max_waiting_pids_per_process,
        );
    }
    if let Some(&hi) = index_of.get(&holder) {
        push_unique(&mut pris[hi].held, rid, config.max_resources_per_process);
    }
}

fn apply_lock_waits(
    snapshots: &[ProcSnapshot],
    system_locks: &[SystemLock],
    index_of: &HashMap<Pid, usize>,
    pris: &mut [ProcessResourceInfo],
    config: &DetectorConfig,
) {
    for snapshot in snapshots {
        if !snapshot.blocked_on_lock {
            continue;
        }
        let Some(&ai) = index_of.get(&snapshot.pid) else {
            continue;
        };
        for lock in system_locks {
            if !lock.is_blocking || lock.pid == snapshot.pid {
                continue;
            }
            push_unique(
                &mut pris[ai].waited_for,
                lock.id,
                config.max_resources_per_process,
            );
            push_unique(
                &mut pris[ai].waiting_on_pids,
                lock.pid,
                config.max_waiting_pids_per_process,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HeldLock;
    use std::collections::HashSet;

    fn snap(pid: Pid, pipe: Option<u64>, blocked_on_pipe: bool) -> ProcSnapshot {
        let mut s = ProcSnapshot {
            pid,
            blocked_on_pipe,
            ..Default::default()
        };
        if let Some(inode) = pipe {
            s.pipe_inodes = HashSet::from([inode]);
        }
        s
    }

    #[test]
    fn pipe_pair_both_blocked_yields_mutual_wait() {
        let snaps = vec![snap(1, Some(42), true), snap(2, Some(42), true)];
        let cfg = DetectorConfig::default();
        let pris = extract(&snaps, &[], &cfg);

        let p1 = pris.iter().find(|p| p.pid == 1).unwrap();
        let p2 = pris.iter().find(|p| p.pid == 2).unwrap();
        assert!(p1.waited_for.contains(&42));
        assert!(p1.held.contains(&42));
        assert!(p2.waited_for.contains(&42));
        assert!(p2.held.contains(&42));
        assert!(p1.waiting_on_pids.contains(&2));
        assert!(p2.waiting_on_pids.contains(&1));
    }

    #[test]
    fn pipe_rid_is_inode_mod_million() {
        let snaps = vec![snap(1, Some(1_000_042), true), snap(2, Some(1_000_042), false)];
        let cfg = DetectorConfig::default();
        let pris = extract(&snaps, &[], &cfg);
        let p1 = pris.iter().find(|p| p.pid == 1).unwrap();
        assert!(p1.waited_for.contains(&42));
    }

    #[test]
    fn held_and_waited_for_can_both_contain_same_rid() {
        let mut s = ProcSnapshot {
            pid: 1,
            blocked_on_lock: true,
            held_locks: vec![HeldLock {
                rid: 9,
                label: "lock 9".into(),
            }],
            ..Default::default()
        };
        s.blocked_on_lock = true;
        let locks = vec![SystemLock {
            id: 9,
            kind: 'P',
            pid: 2,
            inode: 0,
            start: 0,
            end: 0,
            is_blocking: true,
        }];
        let cfg = DetectorConfig::default();
        let pris = extract(std::slice::from_ref(&s), &locks, &cfg);
        let p1 = &pris[0];
        assert!(p1.held.contains(&9));
        assert!(p1.waited_for.contains(&9));
    }

    #[test]
    fn lock_wait_ignores_self_owned_locks() {
        let s = ProcSnapshot {
            pid: 1,
            blocked_on_lock: true,
            ..Default::default()
        };
        let locks = vec![SystemLock {
            id: 5,
            kind: 'P',
            pid: 1,
            inode: 0,
            start: 0,
            end: 0,
            is_blocking: true,
        }];
        let cfg = DetectorConfig::default();
        let pris = extract(&[s], &locks, &cfg);
        assert!(pris[0].waited_for.is_empty());
    }

    #[test]
    fn caps_are_respected() {
        let s = ProcSnapshot {
            pid: 1,
            blocked_on_lock: true,
            ..Default::default()
        };
        let locks: Vec<SystemLock> = (0..10)
            .map(|i| SystemLock {
                id: i,
                kind: 'P',
                pid: 99,
                inode: 0,
                start: 0,
                end: 0,
                is_blocking: true,
            })
            .collect();
        let mut cfg = DetectorConfig::default();
        cfg.max_resources_per_process = 3;
        let pris = extract(&[s], &locks, &cfg);
        assert_eq!(pris[0].waited_for.len(), 3);
    }
}
