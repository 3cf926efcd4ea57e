//! Partitions cycles into definite/potential and builds the final report
//! (spec.md §4.6).

use crate::graph::ResourceGraph;
use crate::types::{
    CycleInfo, DeadlockKind, DeadlockReport, Pid, ProcessResourceInfo, ReportedCycle, VertexKind,
};
use std::collections::HashSet;

const MAX_RECOMMENDATIONS: usize = 5;
const MAX_PIDS_IN_RECOMMENDATION: usize = 10;

/// A cycle is definite iff every resource vertex it contains has
/// `instances == 1`. A cycle with no resource vertices at all (impossible
/// from this core's enumerator, which only ever runs on the full RAG — see
/// SPEC_FULL.md's Open Questions) trivially passes as definite, matching the
/// source `is_deadlock_definite` behavior exactly.
fn is_definite(cycle: &CycleInfo, graph: &ResourceGraph) -> bool {
    cycle.non_closing().iter().all(|&(kind, id)| {
        kind != VertexKind::Resource || graph.instances_for_resource_id(id) == Some(1)
    })
}

fn explanation(index: usize, cycle: &CycleInfo, kind: DeadlockKind) -> String {
    let chain = cycle
        .non_closing()
        .iter()
        .map(|&(k, id)| match k {
            VertexKind::Process => format!("P{id}"),
            VertexKind::Resource => format!("R{id}"),
        })
        .collect::<Vec<_>>()
        .join(" -> ");

    let verdict = match kind {
        DeadlockKind::Definite => "This is a DEFINITE deadlock (single-instance resources).",
        DeadlockKind::Potential => {
            "This is a POTENTIAL deadlock (multi-instance resources may resolve)."
        }
    };

    format!(
        "Cycle #{}: {chain}. This cycle indicates a circular wait condition. {verdict}",
        index + 1
    )
}

/// Whether every process in the cycle also holds, outside the cycle's own
/// resource set, a resource in common with every other process in the
/// cycle. Purely diagnostic — adapted from deloxide's mutex-ownership
/// `filter_cycle_by_common_locks` to this bipartite RAG; it never changes
/// `kind` or `deadlock_detected`.
fn shared_resource_note(cycle: &CycleInfo, pris: &[ProcessResourceInfo]) -> Option<String> {
    let cycle_rids: HashSet<u64> = cycle
        .non_closing()
        .iter()
        .filter(|&&(k, _)| k == VertexKind::Resource)
        .map(|&(_, id)| id)
        .collect();

    let mut pids_in_cycle = cycle
        .non_closing()
        .iter()
        .filter(|&&(k, _)| k == VertexKind::Process)
        .map(|&(_, id)| id as Pid);

    let first_pid = pids_in_cycle.next()?;
    let mut intersection: HashSet<u64> = pris
        .iter()
        .find(|p| p.pid == first_pid)
        .map(|p| p.held.iter().copied().filter(|r| !cycle_rids.contains(r)).collect())
        .unwrap_or_default();

    for pid in pids_in_cycle {
        let held: HashSet<u64> = pris
            .iter()
            .find(|p| p.pid == pid)
            .map(|p| p.held.iter().copied().filter(|r| !cycle_rids.contains(r)).collect())
            .unwrap_or_default();
        intersection = intersection.intersection(&held).copied().collect();
        if intersection.is_empty() {
            return None;
        }
    }

    if intersection.is_empty() {
        None
    } else {
        let mut rids: Vec<_> = intersection.into_iter().collect();
        rids.sort_unstable();
        Some(format!(
            "all processes in this cycle also jointly hold resource(s) {:?} outside the cycle",
            rids
        ))
    }
}

fn recommendations(deadlocked_pids: &[Pid]) -> Vec<String> {
    if deadlocked_pids.is_empty() {
        return Vec::new();
    }

    let mut recs = Vec::with_capacity(MAX_RECOMMENDATIONS);

    let mut rec = "Terminate one of the deadlocked processes: ".to_string();
    for (i, pid) in deadlocked_pids.iter().take(MAX_PIDS_IN_RECOMMENDATION).enumerate() {
        if i > 0 {
            rec.push_str(", ");
        }
        rec.push_str(&format!("PID {pid}"));
    }
    if deadlocked_pids.len() > MAX_PIDS_IN_RECOMMENDATION {
        rec.push_str(&format!(" (and {} more)", deadlocked_pids.len() - MAX_PIDS_IN_RECOMMENDATION));
    }
    rec.push_str(". This will break the circular wait chain.");
    recs.push(rec);

    recs.push("Review resource allocation policies to prevent circular dependencies.".to_string());
    recs.push("Implement resource request timeouts to automatically break deadlocks.".to_string());

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}

/// Builds the final [`DeadlockReport`] from raw enumerated cycles.
///
/// `pris` is only consulted for the diagnostic `shared_resource_note`; the
/// definite/potential split and pid extraction use only `cycles` and `graph`.
pub fn classify(
    cycles: Vec<CycleInfo>,
    graph: &ResourceGraph,
    pris: &[ProcessResourceInfo],
    total_processes_scanned: usize,
) -> DeadlockReport {
    let (definite, potential): (Vec<_>, Vec<_>) =
        cycles.into_iter().partition(|c| is_definite(c, graph));

    let (selected, kind) = if !definite.is_empty() {
        (definite, DeadlockKind::Definite)
    } else {
        (potential, DeadlockKind::Potential)
    };

    let reported_cycles: Vec<ReportedCycle> = selected
        .into_iter()
        .enumerate()
        .map(|(i, cycle)| {
            let explanation = explanation(i, &cycle, kind);
            let note = shared_resource_note(&cycle, pris);
            ReportedCycle {
                cycle,
                kind,
                explanation,
                shared_resource_note: note,
            }
        })
        .collect();

    let mut deadlocked_pids = Vec::new();
    for rc in &reported_cycles {
        for &(k, id) in rc.cycle.non_closing() {
            if k == VertexKind::Process {
                let pid = id as Pid;
                if !deadlocked_pids.contains(&pid) {
                    deadlocked_pids.push(pid);
                }
            }
        }
    }

    let deadlock_detected = !reported_cycles.is_empty();
    let recs = if deadlock_detected {
        recommendations(&deadlocked_pids)
    } else {
        Vec::new()
    };

    let (_, num_resources, _) = graph.statistics();

    DeadlockReport {
        deadlock_detected,
        deadlocked_pids,
        cycles: reported_cycles,
        recommendations: recs,
        timestamp: chrono::Utc::now(),
        total_processes_scanned,
        total_resources_found: num_resources,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycles::enumerate_cycles;
    use crate::graph::ResourceGraph;

    #[test]
    fn no_cycles_means_no_deadlock() {
        let mut g = ResourceGraph::new();
        g.add_process(1);
        let cycles = enumerate_cycles(&mut g);
        let report = classify(cycles, &g, &[], 1);
        assert!(!report.deadlock_detected);
        assert!(report.cycles.is_empty());
        assert!(report.deadlocked_pids.is_empty());
    }

    #[test]
    fn definite_two_party_deadlock() {
        let mut g = ResourceGraph::new();
        g.add_allocation_edge(1, 1001);
        g.add_request_edge(1001, 2);
        g.add_allocation_edge(2, 1002);
        g.add_request_edge(1002, 1);
        let cycles = enumerate_cycles(&mut g);
        let report = classify(cycles, &g, &[], 2);

        assert!(report.deadlock_detected);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.cycles[0].kind, DeadlockKind::Definite);
        let mut pids = report.deadlocked_pids.clone();
        pids.sort_unstable();
        assert_eq!(pids, vec![1001, 1002]);
        assert_eq!(report.recommendations.len(), 3);
        assert!(report.recommendations[0].contains("PID 1001"));
    }

    #[test]
    fn multi_instance_resource_yields_potential() {
        let mut g = ResourceGraph::new();
        g.add_allocation_edge(1, 1001);
        g.add_request_edge(1001, 2);
        g.add_allocation_edge(2, 1002);
        g.add_request_edge(1002, 1);
        g.add_resource(2, 2);
        let cycles = enumerate_cycles(&mut g);
        let report = classify(cycles, &g, &[], 2);

        assert!(report.deadlock_detected);
        assert_eq!(report.cycles[0].kind, DeadlockKind::Potential);
        assert!(report.cycles[0].explanation.contains("POTENTIAL"));
    }

    #[test]
    fn self_loop_is_reported_as_definite() {
        let mut g = ResourceGraph::new();
        g.add_request_edge(1, 1);
        g.add_allocation_edge(1, 1);
        let cycles = enumerate_cycles(&mut g);
        let report = classify(cycles, &g, &[], 1);
        assert!(report.deadlock_detected);
        assert_eq!(report.cycles[0].kind, DeadlockKind::Definite);
    }

    #[test]
    fn disjoint_cycles_collect_all_pids() {
        let mut g = ResourceGraph::new();
        g.add_allocation_edge(1, 1);
        g.add_request_edge(1, 2);
        g.add_allocation_edge(2, 2);
        g.add_request_edge(2, 1);

        g.add_allocation_edge(3, 3);
        g.add_request_edge(3, 4);
        g.add_allocation_edge(4, 4);
        g.add_request_edge(4, 3);

        let cycles = enumerate_cycles(&mut g);
        let report = classify(cycles, &g, &[], 4);
        let mut pids = report.deadlocked_pids.clone();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 2, 3, 4]);
    }
}
