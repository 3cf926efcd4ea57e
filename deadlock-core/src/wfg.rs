//! Wait-For Graph projection (spec.md §4.7) — a presentation-only view used
//! by the reporter/formatter to render human-readable wait chains. Never
//! consumed by the cycle enumerator, which always runs on the full RAG.

use crate::types::{Pid, VertexKind};
use crate::graph::ResourceGraph;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WfgEdge {
    pub from: Pid,
    pub to: Pid,
}

/// For every `P1 → R → P2` path in `graph` (request edge then allocation
/// edge), adds the edge `P1 → P2`. Resource vertices never appear in the
/// result.
pub fn project(graph: &ResourceGraph) -> Vec<WfgEdge> {
    let mut edges: BTreeMap<(Pid, Pid), ()> = BTreeMap::new();

    for v in 0..graph.num_vertices() {
        if graph.vertex_kind(v) != VertexKind::Process {
            continue;
        }
        let p1 = graph.vertex_id(v) as Pid;
        for &r in graph.neighbors(v) {
            if graph.vertex_kind(r) != VertexKind::Resource {
                continue;
            }
            for &p2 in graph.neighbors(r) {
                if graph.vertex_kind(p2) != VertexKind::Process {
                    continue;
                }
                let p2 = graph.vertex_id(p2) as Pid;
                edges.insert((p1, p2), ());
            }
        }
    }

    edges.into_keys().map(|(from, to)| WfgEdge { from, to }).collect()
}
