//! Single-source shortest path over an [`NtmGraph`].
//!
//! Plain binary-heap Dijkstra.  Edge weights must be non-negative, which both
//! tiers guarantee (lengths and travel times).  All-pairs route sampling
//! lives in the routing crate; this query serves graph construction and the
//! isolated-area repair walk, where only one origin at a time matters.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ntm_core::{EdgeId, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::graph::NtmGraph;

/// A shortest path as an ordered edge list.
#[derive(Clone, Debug)]
pub struct Route {
    /// Edges from origin to destination, in traversal order.
    pub edges: Vec<EdgeId>,
    /// Sum of edge weights along the path.
    pub total_weight: f64,
}

impl Route {
    /// Node sequence origin..=destination.
    pub fn node_sequence(&self, graph: &NtmGraph, origin: NodeId) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.edges.len() + 1);
        nodes.push(origin);
        for &e in &self.edges {
            nodes.push(graph.edge(e).to);
        }
        nodes
    }
}

/// Heap entry ordered by smallest cost first.
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}
impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other.cost.total_cmp(&self.cost)
    }
}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra from `from` to `to`.
///
/// Returns [`GraphError::NoRoute`] when `to` is unreachable.
pub fn shortest_path(graph: &NtmGraph, from: NodeId, to: NodeId) -> GraphResult<Route> {
    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<EdgeId>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[from.index()] = 0.0;
    heap.push(QueueEntry { cost: 0.0, node: from });

    while let Some(QueueEntry { cost, node }) = heap.pop() {
        if node == to {
            break;
        }
        if cost > dist[node.index()] {
            continue; // stale entry
        }
        for &eid in graph.out_edges(node) {
            let edge = graph.edge(eid);
            let next = cost + edge.weight;
            if next < dist[edge.to.index()] {
                dist[edge.to.index()] = next;
                prev[edge.to.index()] = Some(eid);
                heap.push(QueueEntry { cost: next, node: edge.to });
            }
        }
    }

    if !dist[to.index()].is_finite() {
        return Err(GraphError::NoRoute { from, to });
    }

    // Walk predecessors back from the destination.
    let mut edges = Vec::new();
    let mut cursor = to;
    while cursor != from {
        let eid = prev[cursor.index()].expect("finite distance implies a predecessor");
        edges.push(eid);
        cursor = graph.edge(eid).from;
    }
    edges.reverse();

    Ok(Route { edges, total_weight: dist[to.index()] })
}
