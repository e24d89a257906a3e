//! Cycle detection over the dependency edge set.
//!
//! Edges point from dependent to blocking task. A proposed edge
//! `dependent -> blocking` closes a cycle exactly when the dependent task
//! is already reachable from the blocking task along existing edges, so
//! the check is a single directed traversal from the blocking task.

use crate::domain::{CycleCheck, TaskDependency, TaskId};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Check whether adding `dependent -> blocking` to the given edge set
/// would create a cycle.
///
/// This is a pure function over a snapshot of the edges; it performs no
/// storage access. When a cycle is found, the returned path is the
/// existing chain from the blocking task to the dependent task (the chain
/// the proposed edge would close into a loop).
///
/// A self-referencing proposal is reported as a cycle with a
/// single-element path, without any traversal.
#[must_use]
pub fn would_create_cycle(
    edges: &[TaskDependency],
    dependent: &TaskId,
    blocking: &TaskId,
) -> CycleCheck {
    if dependent == blocking {
        return CycleCheck::cycle(vec![dependent.clone()]);
    }

    let (graph, nodes) = build_graph(edges);

    let Some(&start) = nodes.get(blocking) else {
        // The blocking task has no outgoing edges, nothing is reachable
        return CycleCheck::clear();
    };
    let Some(&target) = nodes.get(dependent) else {
        return CycleCheck::clear();
    };

    match find_path(&graph, start, target) {
        Some(path) => {
            let chain = path.into_iter().map(|ix| graph[ix].clone()).collect();
            CycleCheck::cycle(chain)
        }
        None => CycleCheck::clear(),
    }
}

/// Whether the edge set as a whole is acyclic.
#[must_use]
pub fn is_acyclic(edges: &[TaskDependency]) -> bool {
    let (graph, _) = build_graph(edges);
    !is_cyclic_directed(&graph)
}

/// Build a directed graph with one edge per dependency, pointing from
/// dependent to blocking task.
fn build_graph(edges: &[TaskDependency]) -> (DiGraph<TaskId, ()>, HashMap<TaskId, NodeIndex>) {
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<TaskId, NodeIndex> = HashMap::new();

    for edge in edges {
        let from = node_for(&mut graph, &mut nodes, &edge.dependent_task_id);
        let to = node_for(&mut graph, &mut nodes, &edge.blocking_task_id);
        graph.add_edge(from, to, ());
    }

    (graph, nodes)
}

fn node_for(
    graph: &mut DiGraph<TaskId, ()>,
    nodes: &mut HashMap<TaskId, NodeIndex>,
    task: &TaskId,
) -> NodeIndex {
    *nodes
        .entry(task.clone())
        .or_insert_with(|| graph.add_node(task.clone()))
}

/// Depth-first search from `start` to `target`, returning the node path
/// including both endpoints.
fn find_path(
    graph: &DiGraph<TaskId, ()>,
    start: NodeIndex,
    target: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut stack = vec![start];
    let mut visited = vec![false; graph.node_count()];
    visited[start.index()] = true;

    while let Some(node) = stack.pop() {
        if node == target {
            let mut path = vec![node];
            let mut current = node;
            while let Some(&prev) = parent.get(&current) {
                path.push(prev);
                current = prev;
            }
            path.reverse();
            return Some(path);
        }
        for next in graph.neighbors(node) {
            if !visited[next.index()] {
                visited[next.index()] = true;
                parent.insert(next, node);
                stack.push(next);
            }
        }
    }

    None
}
