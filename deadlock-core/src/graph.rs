//! The Resource Allocation Graph (spec.md §4.4).
//!
//! Vertices live in a single contiguous array indexed by `usize`; adjacency
//! is a per-vertex growable `Vec<usize>` of neighbor indices. DFS metadata
//! (`color`, `parent`) is a parallel array of the same length, reset at the
//! start of every enumeration pass. No cyclic ownership arises because
//! adjacency stores indices, not pointers — the REDESIGN FLAGS in spec.md §9
//! call this out explicitly as the replacement for a linked-list-of-raw-
//! pointers adjacency structure.

use crate::types::{Pid, Rid, VertexKind};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    White,
    Gray,
    Black,
}

#[derive(Debug, Clone)]
struct VertexData {
    kind: VertexKind,
    id: u64,
    /// Only meaningful for resource vertices; `1` for process vertices.
    instances: usize,
}

/// A directed multigraph over processes and resources.
#[derive(Debug, Default)]
pub struct ResourceGraph {
    vertices: Vec<VertexData>,
    out_edges: Vec<Vec<usize>>,
    process_index: HashMap<Pid, usize>,
    resource_index: HashMap<Rid, usize>,
    color: Vec<Color>,
    parent: Vec<Option<usize>>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        ResourceGraph::default()
    }

    /// Sizes the underlying storage exactly from the expected process and
    /// resource counts, replacing the original C implementation's fixed
    /// `2 × num_processes` estimate (spec.md §9 Open Questions).
    pub fn with_capacity(expected_processes: usize, expected_resources: usize) -> Self {
        let cap = expected_processes + expected_resources;
        ResourceGraph {
            vertices: Vec::with_capacity(cap),
            out_edges: Vec::with_capacity(cap),
            process_index: HashMap::with_capacity(expected_processes),
            resource_index: HashMap::with_capacity(expected_resources),
            color: Vec::with_capacity(cap),
            parent: Vec::with_capacity(cap),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub(crate) fn vertex_kind(&self, v: usize) -> VertexKind {
        self.vertices[v].kind
    }

    pub(crate) fn vertex_id(&self, v: usize) -> u64 {
        self.vertices[v].id
    }

    pub(crate) fn instances(&self, v: usize) -> usize {
        self.vertices[v].instances
    }

    /// Looks up a resource vertex's instance count by its RID. Used by the
    /// classifier after cycle enumeration, while the graph is still alive.
    pub fn instances_for_resource_id(&self, rid: Rid) -> Option<usize> {
        self.resource_index.get(&rid).map(|&idx| self.vertices[idx].instances)
    }

    pub(crate) fn neighbors(&self, v: usize) -> &[usize] {
        &self.out_edges[v]
    }

    fn push_vertex(&mut self, kind: VertexKind, id: u64, instances: usize) -> usize {
        let idx = self.vertices.len();
        self.vertices.push(VertexData { kind, id, instances });
        self.out_edges.push(Vec::new());
        self.color.push(Color::White);
        self.parent.push(None);
        idx
    }

    /// Idempotent; returns the existing vertex if the pid is already present.
    pub fn add_process(&mut self, pid: Pid) -> usize {
        if let Some(&idx) = self.process_index.get(&pid) {
            return idx;
        }
        let idx = self.push_vertex(VertexKind::Process, pid as u64, 1);
        self.process_index.insert(pid, idx);
        idx
    }

    /// Idempotent on `rid`; a second call with a different `instances`
    /// updates it (last-writer-wins), per spec.md §4.4.
    pub fn add_resource(&mut self, rid: Rid, instances: usize) -> usize {
        let instances = instances.max(1);
        if let Some(&idx) = self.resource_index.get(&rid) {
            self.vertices[idx].instances = instances;
            return idx;
        }
        let idx = self.push_vertex(VertexKind::Resource, rid, instances);
        self.resource_index.insert(rid, idx);
        idx
    }

    /// Adds a P→R request edge, creating vertices if absent. Idempotent: at
    /// most one request edge exists between a given pid and rid.
    pub fn add_request_edge(&mut self, pid: Pid, rid: Rid) {
        let p = self.add_process(pid);
        let r = self.add_resource(rid, 1);
        self.add_edge(p, r);
    }

    /// Adds an R→P allocation edge, creating vertices if absent. Idempotent.
    pub fn add_allocation_edge(&mut self, rid: Rid, pid: Pid) {
        let r = self.add_resource(rid, 1);
        let p = self.add_process(pid);
        self.add_edge(r, p);
    }

    fn add_edge(&mut self, from: usize, to: usize) {
        if !self.out_edges[from].contains(&to) {
            self.out_edges[from].push(to);
        }
    }

    /// `(num_processes, num_resources, num_edges)`.
    pub fn statistics(&self) -> (usize, usize, usize) {
        let num_edges = self.out_edges.iter().map(Vec::len).sum();
        (self.process_index.len(), self.resource_index.len(), num_edges)
    }

    /// Sets every vertex back to `White` and clears every parent pointer,
    /// ready for a fresh cycle-enumeration pass.
    pub fn reset_dfs_state(&mut self) {
        for c in &mut self.color {
            *c = Color::White;
        }
        for p in &mut self.parent {
            *p = None;
        }
    }

    pub(crate) fn color_of(&self, v: usize) -> Color {
        self.color[v]
    }

    pub(crate) fn set_color(&mut self, v: usize, color: Color) {
        self.color[v] = color;
    }

    pub(crate) fn parent_of(&self, v: usize) -> Option<usize> {
        self.parent[v]
    }

    pub(crate) fn set_parent(&mut self, v: usize, parent: Option<usize>) {
        self.parent[v] = parent;
    }

    pub(crate) fn clear_parents(&mut self) {
        for p in &mut self.parent {
            *p = None;
        }
    }
}

/// Builds a RAG from the dependency extractor's output, in input order
/// (spec.md §4.4): for each PRI, add the process vertex, then one
/// allocation edge per held RID, then one request edge per waited-for RID.
pub fn build_from_pris(pris: &[crate::types::ProcessResourceInfo]) -> ResourceGraph {
    let mut graph = ResourceGraph::with_capacity(pris.len(), pris.len() * 2);
    for pri in pris {
        graph.add_process(pri.pid);
        for &rid in &pri.held {
            graph.add_allocation_edge(rid, pri.pid);
        }
        for &rid in &pri.waited_for {
            graph.add_request_edge(pri.pid, rid);
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_process_is_idempotent() {
        let mut g = ResourceGraph::new();
        let a = g.add_process(1);
        let b = g.add_process(1);
        assert_eq!(a, b);
        assert_eq!(g.num_vertices(), 1);
    }

    #[test]
    fn add_resource_last_writer_wins_instances() {
        let mut g = ResourceGraph::new();
        let r1 = g.add_resource(10, 1);
        let r2 = g.add_resource(10, 3);
        assert_eq!(r1, r2);
        assert_eq!(g.instances(r1), 3);
    }

    #[test]
    fn edges_are_deduplicated() {
        let mut g = ResourceGraph::new();
        g.add_request_edge(1, 10);
        g.add_request_edge(1, 10);
        let p = g.add_process(1);
        assert_eq!(g.neighbors(p).len(), 1);
    }

    #[test]
    fn edge_kinds_respect_bipartite_invariant() {
        let mut g = ResourceGraph::new();
        g.add_request_edge(1, 10);
        g.add_allocation_edge(10, 2);
        let (procs, ress, edges) = g.statistics();
        assert_eq!(procs, 2);
        assert_eq!(ress, 1);
        assert_eq!(edges, 2);
        for v in 0..g.num_vertices() {
            for &w in g.neighbors(v) {
                assert_ne!(g.vertex_kind(v), g.vertex_kind(w));
            }
        }
    }
}
