//! DFS-based all-cycles enumerator with canonical deduplication (spec.md §4.5).
//!
//! Recursion depth would be bounded by `V`, but spec.md §4.5 requires
//! converting to an explicit work stack when adequate native stack cannot be
//! guaranteed — on a system with `max_processes = 10_000` that bound is
//! uncomfortably close to typical thread stack sizes, so this is iterative
//! from the start rather than a recursive implementation with a caveat.

use crate::graph::{Color, ResourceGraph};
use crate::types::CycleInfo;
use std::collections::HashSet;

/// Enumerates every elementary cycle in `graph`, deduplicated modulo
/// rotation. Resets and leaves behind fresh DFS coloring state.
pub fn enumerate_cycles(graph: &mut ResourceGraph) -> Vec<CycleInfo> {
    graph.reset_dfs_state();
    let n = graph.num_vertices();

    let mut canonical_cycles: Vec<Vec<usize>> = Vec::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();

    for s in 0..n {
        if graph.color_of(s) != Color::White {
            continue;
        }
        graph.clear_parents();
        visit(graph, s, &mut canonical_cycles, &mut seen);
    }

    canonical_cycles
        .into_iter()
        .map(|canon| to_cycle_info(graph, &canon))
        .collect()
}

fn visit(
    graph: &mut ResourceGraph,
    root: usize,
    canonical_cycles: &mut Vec<Vec<usize>>,
    seen: &mut HashSet<Vec<usize>>,
) {
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    graph.set_color(root, Color::Gray);

    while let Some(&(u, idx)) = stack.last() {
        if idx >= graph.neighbors(u).len() {
            graph.set_color(u, Color::Black);
            stack.pop();
            continue;
        }

        let w = graph.neighbors(u)[idx];
        stack.last_mut().unwrap().1 += 1;

        match graph.color_of(w) {
            Color::White => {
                graph.set_parent(w, Some(u));
                graph.set_color(w, Color::Gray);
                stack.push((w, 0));
            }
            Color::Gray => {
                let raw = reconstruct_cycle(graph, u, w);
                record_cycle(raw, canonical_cycles, seen);
            }
            Color::Black => {}
        }
    }
}

/// Walks `u`'s parent chain back to ancestor `w`, then appends `w` again to
/// close the cycle: `[w, …, u, w]`. `u == w` (a self-loop discovered at
/// enumeration time) yields `[w, w]`.
fn reconstruct_cycle(graph: &ResourceGraph, u: usize, w: usize) -> Vec<usize> {
    let mut chain = vec![u];
    let mut cur = u;
    while cur != w {
        match graph.parent_of(cur) {
            Some(p) => {
                chain.push(p);
                cur = p;
            }
            None => break,
        }
    }
    chain.reverse();
    chain.push(w);
    chain
}

fn record_cycle(raw: Vec<usize>, canonical_cycles: &mut Vec<Vec<usize>>, seen: &mut HashSet<Vec<usize>>) {
    let non_closing = &raw[..raw.len() - 1];
    let canon = canonical_rotation(non_closing);
    if seen.insert(canon.clone()) {
        canonical_cycles.push(canon);
    }
}

/// Rotates so the smallest vertex index appears first — stable across runs
/// for a fixed RAG, as spec.md §4.5 recommends.
fn canonical_rotation(non_closing: &[usize]) -> Vec<usize> {
    let min_pos = non_closing
        .iter()
        .enumerate()
        .min_by_key(|&(_, v)| *v)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut rotated = Vec::with_capacity(non_closing.len());
    rotated.extend_from_slice(&non_closing[min_pos..]);
    rotated.extend_from_slice(&non_closing[..min_pos]);
    rotated
}

fn to_cycle_info(graph: &ResourceGraph, canon: &[usize]) -> CycleInfo {
    let mut vertices: Vec<_> = canon
        .iter()
        .map(|&v| (graph.vertex_kind(v), graph.vertex_id(v)))
        .collect();
    vertices.push(vertices[0]);
    CycleInfo { vertices }
}
