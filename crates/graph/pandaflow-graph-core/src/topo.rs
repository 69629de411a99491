use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashMap;

use crate::error::CompileError;
use crate::types::{GraphSpec, NodeId};

/// Map node id -> insertion index. Assumes ids are unique; the compiler
/// rejects duplicates before ordering.
fn node_index(graph: &GraphSpec) -> HashMap<&str, usize> {
    graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect()
}

/// Adjacency lists and in-degrees by insertion index. Edges naming unknown
/// node ids impose no ordering constraint and are skipped.
fn adjacency(graph: &GraphSpec, index: &HashMap<&str, usize>) -> (Vec<Vec<usize>>, Vec<usize>) {
    let mut adj = vec![Vec::new(); graph.nodes.len()];
    let mut indegree = vec![0usize; graph.nodes.len()];
    for edge in &graph.edges {
        match (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
            (Some(&source), Some(&target)) => {
                adj[source].push(target);
                indegree[target] += 1;
            }
            _ => {
                log::warn!(
                    "ignoring edge {} -> {}: unknown endpoint",
                    edge.source,
                    edge.target
                );
            }
        }
    }
    (adj, indegree)
}

/// Find one cycle in the graph, if any, via depth-first search. The returned
/// ids are the participants of the first cycle reached, in insertion order.
pub fn find_cycle(graph: &GraphSpec) -> Option<Vec<NodeId>> {
    let index = node_index(graph);
    let (adj, _) = adjacency(graph, &index);

    const WHITE: u8 = 0; // unvisited
    const GRAY: u8 = 1; // on the current path
    const BLACK: u8 = 2; // fully explored
    let mut state = vec![WHITE; graph.nodes.len()];
    let mut path: Vec<usize> = Vec::new();

    for start in 0..graph.nodes.len() {
        if state[start] != WHITE {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        state[start] = GRAY;
        path.push(start);

        while let Some(&(u, cursor)) = stack.last() {
            if cursor < adj[u].len() {
                let top = stack.len() - 1;
                stack[top].1 += 1;
                let v = adj[u][cursor];
                match state[v] {
                    WHITE => {
                        state[v] = GRAY;
                        path.push(v);
                        stack.push((v, 0));
                    }
                    GRAY => {
                        // Back edge: everything on the path from `v` is cyclic.
                        let pos = path
                            .iter()
                            .position(|&p| p == v)
                            .expect("gray nodes are on the path");
                        let mut ids: Vec<usize> = path[pos..].to_vec();
                        ids.sort_unstable();
                        return Some(
                            ids.into_iter()
                                .map(|i| graph.nodes[i].id.clone())
                                .collect(),
                        );
                    }
                    _ => {}
                }
            } else {
                state[u] = BLACK;
                path.pop();
                stack.pop();
            }
        }
    }
    None
}

/// Topologically order the graph's nodes so that every node follows all of
/// its upstream dependencies.
///
/// Kahn's algorithm with a min-insertion-index heap: nodes with no ordering
/// constraint between them keep the graph's insertion order, so the same
/// graph always yields the same order (and therefore byte-identical
/// generated scripts).
pub fn topo_order(graph: &GraphSpec) -> Result<Vec<NodeId>, CompileError> {
    if let Some(ids) = find_cycle(graph) {
        return Err(CompileError::CyclicGraph { ids });
    }

    let index = node_index(graph);
    let (adj, mut indegree) = adjacency(graph, &index);

    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(graph.nodes.len());
    while let Some(Reverse(u)) = ready.pop() {
        order.push(graph.nodes[u].id.clone());
        for &v in &adj[u] {
            indegree[v] -= 1;
            if indegree[v] == 0 {
                ready.push(Reverse(v));
            }
        }
    }

    debug_assert_eq!(order.len(), graph.nodes.len(), "acyclic graph orders fully");
    Ok(order)
}
