//! All-pairs shortest paths with first-edge recovery.
//!
//! Floyd–Warshall over a dense distance matrix.  The area graph is small
//! (one vertex per zone plus FLOW endpoints), so the cubic pass is cheap and
//! runs once per sampling pass.  Alongside distances we track, for every
//! (origin, destination) pair, the *first edge* leaving the origin on a
//! shortest path — the only part of the path route-choice needs.

use ntm_core::{EdgeId, NodeId};
use ntm_graph::NtmGraph;

/// Dense all-pairs shortest-path solution.
pub struct AllPairs {
    n: usize,
    dist: Vec<f64>,
    first_edge: Vec<Option<EdgeId>>,
}

impl AllPairs {
    /// Solve all pairs over `graph`, with edge weights overridden by
    /// `weights` (indexed by edge id — one entry per edge, perturbed or not).
    pub fn solve(graph: &NtmGraph, weights: &[f64]) -> AllPairs {
        debug_assert_eq!(weights.len(), graph.edge_count());
        let n = graph.node_count();
        let mut dist = vec![f64::INFINITY; n * n];
        let mut first_edge: Vec<Option<EdgeId>> = vec![None; n * n];

        for i in 0..n {
            dist[i * n + i] = 0.0;
        }
        for (idx, edge) in graph.edges().enumerate() {
            let (u, v) = (edge.from.index(), edge.to.index());
            let w = weights[idx];
            // Parallel edges: keep the lighter one.
            if w < dist[u * n + v] {
                dist[u * n + v] = w;
                first_edge[u * n + v] = Some(EdgeId(idx as u32));
            }
        }

        for k in 0..n {
            for i in 0..n {
                let d_ik = dist[i * n + k];
                if !d_ik.is_finite() {
                    continue;
                }
                for j in 0..n {
                    let candidate = d_ik + dist[k * n + j];
                    if candidate < dist[i * n + j] {
                        dist[i * n + j] = candidate;
                        first_edge[i * n + j] = first_edge[i * n + k];
                    }
                }
            }
        }

        AllPairs { n, dist, first_edge }
    }

    #[inline]
    pub fn distance(&self, from: NodeId, to: NodeId) -> f64 {
        self.dist[from.index() * self.n + to.index()]
    }

    /// First edge leaving `from` on a shortest path to `to`; `None` when
    /// unreachable or `from == to`.
    #[inline]
    pub fn first_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.first_edge[from.index() * self.n + to.index()]
    }

    #[inline]
    pub fn reachable(&self, from: NodeId, to: NodeId) -> bool {
        self.distance(from, to).is_finite()
    }
}
