//! Route-fraction sampling and the frozen per-OD share tables.
//!
//! The share of traffic that advances from an origin towards a destination
//! via a given neighbour is estimated by repetition: perturb every area-graph
//! edge weight by an independent Gaussian factor, re-solve all-pairs shortest
//! paths, and credit the first edge of each OD pair's path.  After K passes
//! each credit count divided by K is the neighbour's share.
//!
//! Counts are accumulated as integers and divided once at the end, so a
//! neighbour chosen in every pass gets a share of exactly 1.0.

use log::{debug, warn};
use rand::Rng;
use rand_distr::StandardNormal;
use rustc_hash::FxHashMap;

use ntm_core::{EdgeId, NodeId, SimRng};
use ntm_graph::{NtmGraph, TrafficBehaviourType};

use crate::floyd::AllPairs;

/// Perturbation factors are clamped below at this value so an edge can never
/// get a zero or negative weight.
pub const MIN_WEIGHT_FACTOR: f64 = 0.05;

type OdKey = (NodeId, NodeId);

/// Frozen per-OD route-choice tables.
///
/// For each reachable (origin, destination) pair: the fraction of sampling
/// passes in which each neighbour began the shortest path, and — when that
/// first edge was FLOW-typed — the same fraction per flow edge (every cell
/// of the edge inherits it).  Shares over an OD pair sum to at most 1.0;
/// exactly 1.0 when every pass found a path.
pub struct RouteFractions {
    passes: usize,
    neighbour: FxHashMap<OdKey, FxHashMap<NodeId, f64>>,
    flow_edges: FxHashMap<OdKey, FxHashMap<EdgeId, f64>>,
}

impl RouteFractions {
    /// Share of trips from `origin` to `destination` advancing via
    /// `neighbour` next.  Zero for unknown pairs.
    pub fn share(&self, origin: NodeId, destination: NodeId, neighbour: NodeId) -> f64 {
        self.neighbour
            .get(&(origin, destination))
            .and_then(|m| m.get(&neighbour))
            .copied()
            .unwrap_or(0.0)
    }

    /// All neighbour shares for an OD pair.
    pub fn shares(&self, origin: NodeId, destination: NodeId) -> Option<&FxHashMap<NodeId, f64>> {
        self.neighbour.get(&(origin, destination))
    }

    /// Per-flow-edge shares for an OD pair (first edge was a highway).
    pub fn flow_shares(&self, origin: NodeId, destination: NodeId) -> Option<&FxHashMap<EdgeId, f64>> {
        self.flow_edges.get(&(origin, destination))
    }

    /// Sum of neighbour shares for an OD pair; ≤ 1.0 always, < 1.0 only when
    /// some passes found no path.
    pub fn total_share(&self, origin: NodeId, destination: NodeId) -> f64 {
        self.neighbour
            .get(&(origin, destination))
            .map(|m| m.values().sum())
            .unwrap_or(0.0)
    }

    /// Number of sampling passes the table was built from.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// OD pairs with at least one credited neighbour.
    pub fn od_pairs(&self) -> usize {
        self.neighbour.len()
    }
}

/// Run `passes` perturbation passes over `graph` and build the share tables.
///
/// `weight_variance` is the variance of the Gaussian factor applied to every
/// edge weight (mean 1.0); zero variance reduces every pass to the same
/// deterministic shortest paths.  A pass in which an OD pair has no path
/// contributes nothing for that pair.
pub fn sample_route_fractions(
    graph: &NtmGraph,
    passes: usize,
    weight_variance: f64,
    rng: &mut SimRng,
) -> RouteFractions {
    if weight_variance < 0.0 {
        warn!("negative route weight variance {weight_variance} treated as 0");
    }
    let sigma = weight_variance.max(0.0).sqrt();
    let base: Vec<f64> = graph.edges().map(|e| e.weight).collect();

    let mut neighbour_counts: FxHashMap<OdKey, FxHashMap<NodeId, u32>> = FxHashMap::default();
    let mut flow_counts: FxHashMap<OdKey, FxHashMap<EdgeId, u32>> = FxHashMap::default();

    let mut weights = vec![0.0; base.len()];
    for pass in 0..passes {
        let mut pass_rng = rng.child(pass as u64);
        for (w, &b) in weights.iter_mut().zip(&base) {
            let z: f64 = pass_rng.inner().sample(StandardNormal);
            *w = b * (1.0 + sigma * z).max(MIN_WEIGHT_FACTOR);
        }

        let solved = AllPairs::solve(graph, &weights);
        for origin in graph.nodes() {
            for destination in graph.nodes() {
                if origin.id == destination.id {
                    continue;
                }
                let Some(eid) = solved.first_edge(origin.id, destination.id) else {
                    continue;
                };
                let edge = graph.edge(eid);
                *neighbour_counts
                    .entry((origin.id, destination.id))
                    .or_default()
                    .entry(edge.to)
                    .or_insert(0) += 1;
                if edge.behaviour == TrafficBehaviourType::Flow {
                    *flow_counts
                        .entry((origin.id, destination.id))
                        .or_default()
                        .entry(eid)
                        .or_insert(0) += 1;
                }
            }
        }
    }

    debug!(
        "route sampling done: {} passes, {} OD pairs credited",
        passes,
        neighbour_counts.len()
    );

    let k = passes as f64;
    RouteFractions {
        passes,
        neighbour: finalize(neighbour_counts, k),
        flow_edges: finalize(flow_counts, k),
    }
}

fn finalize<K: std::hash::Hash + Eq>(
    counts: FxHashMap<OdKey, FxHashMap<K, u32>>,
    k: f64,
) -> FxHashMap<OdKey, FxHashMap<K, f64>> {
    counts
        .into_iter()
        .map(|(od, inner)| {
            (od, inner.into_iter().map(|(key, c)| (key, c as f64 / k)).collect())
        })
        .collect()
}
