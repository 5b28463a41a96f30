//! Isolated-area reconnection.
//!
//! Zones whose adjacency detection found no touching neighbour would be
//! unreachable in the area graph.  [`connect_isolated_areas`] searches the
//! spatial index around each such zone, walks fine-graph shortest paths
//! towards nearby zones, and synthesizes direct edges to whatever reachable
//! zone or FLOW vertex the walk first leaves the isolated zone through.
//! Every per-candidate failure is logged and skipped.

use log::{debug, info};

use ntm_core::AreaId;
use ntm_geo::{Area, AreaIndex};

use crate::builder::{BuiltGraphs, CONNECTOR_CAPACITY_PER_HOUR, CONNECTOR_SPEED_KMH};
use crate::graph::NtmGraph;
use crate::link::{LinkEdge, TrafficBehaviourType};
use crate::path::shortest_path;

/// Initial half-width of the candidate search envelope, metres.
pub const DEFAULT_SEARCH_RADIUS: f64 = 2000.0;
/// Envelope is shrunk until at most this many candidates remain.
pub const TARGET_CANDIDATES: usize = 6;
/// Shrink factor applied per refinement step.
const SHRINK_FACTOR: f64 = 0.8;
/// Refinement step bound.  Candidates whose envelope overlaps the isolated
/// zone's own envelope match at every radius, so the target count is not
/// always reachable; after this many steps repair proceeds with the
/// candidates on hand.
const MAX_SHRINK_STEPS: usize = 32;

/// Outcome counters for one repair pass.
#[derive(Default, Debug)]
pub struct RepairReport {
    /// Zones that started the pass with an empty touching-set.
    pub isolated_areas: usize,
    /// Zones that gained at least one synthesized edge.
    pub repaired_areas: usize,
    /// Directed edges added to the area graph.
    pub synthesized_edges: usize,
}

/// Reconnect every zone with an empty touching-set.
///
/// Mutates `areas` (touching-sets gain the repaired relations, both sides)
/// and appends edges to `built.area_graph`.  A zone none of whose candidates
/// could be reached stays isolated; this is logged, never fatal.
pub fn connect_isolated_areas(areas: &mut [Area], built: &mut BuiltGraphs) -> RepairReport {
    let index = AreaIndex::build(areas);
    let mut report = RepairReport::default();

    let isolated: Vec<AreaId> =
        areas.iter().filter(|a| a.touching.is_empty()).map(|a| a.id).collect();
    report.isolated_areas = isolated.len();

    for area_id in isolated {
        let candidates = shrink_to_target(&index, &areas[area_id.index()]);
        debug!(
            "repairing isolated area {:?}: {} candidates",
            areas[area_id.index()].code,
            candidates.len()
        );

        let mut added = 0;
        for candidate in candidates {
            added += repair_towards(areas, built, area_id, candidate);
        }
        if added > 0 {
            report.repaired_areas += 1;
            report.synthesized_edges += added;
        } else {
            info!("area {:?} could not be reconnected", areas[area_id.index()].code);
        }
    }
    report
}

/// Query the index around `area`, shrinking the envelope by 20% steps while
/// more than [`TARGET_CANDIDATES`] zones match.  Shrinking below the target
/// never discards the last non-empty result set, and refinement is bounded
/// by [`MAX_SHRINK_STEPS`] — best-effort when overlapping envelopes keep the
/// set above the target at every radius.
fn shrink_to_target(index: &AreaIndex, area: &Area) -> Vec<AreaId> {
    let mut radius = DEFAULT_SEARCH_RADIUS;
    let mut candidates = index.query_expanded(area, radius);
    for _ in 0..MAX_SHRINK_STEPS {
        if candidates.len() <= TARGET_CANDIDATES {
            break;
        }
        radius *= SHRINK_FACTOR;
        let narrowed = index.query_expanded(area, radius);
        if narrowed.is_empty() {
            break;
        }
        candidates = narrowed;
    }
    // The tree yields candidates in arbitrary order; sort so repair is
    // deterministic across runs.
    candidates.sort_unstable();
    candidates
}

/// Walk the fine-graph shortest path from the isolated zone's centroid
/// towards `candidate`'s centroid; synthesize one edge at the first vertex
/// that lies in a different zone, or at the first FLOW link.  Returns the
/// number of directed edges added (0 on any failure).
fn repair_towards(
    areas: &mut [Area],
    built: &mut BuiltGraphs,
    isolated: AreaId,
    candidate: AreaId,
) -> usize {
    let from = built.link_centroid[isolated.index()];
    let to = built.link_centroid[candidate.index()];
    let route = match shortest_path(&built.link_graph, from, to) {
        Ok(route) => route,
        Err(err) => {
            debug!("repair path {isolated:?} -> {candidate:?} failed: {err}");
            return 0;
        }
    };

    for &eid in &route.edges {
        let edge = built.link_graph.edge(eid);
        if edge.behaviour == TrafficBehaviourType::Flow {
            // Joining a highway: tie the centroid to the FLOW vertex.
            let code = format!("flow:{}", built.link_graph.node(edge.to).code);
            let Some(flow_node) = built.area_graph.node_by_code(&code) else {
                debug!("repair: flow vertex {code:?} missing from area graph");
                return 0;
            };
            return synthesize_pair(
                &mut built.area_graph,
                built.area_centroid[isolated.index()],
                flow_node,
            );
        }
        let reached = built.link_graph.node(edge.to);
        if let Some(other) = reached.area {
            if other != isolated {
                let added = synthesize_pair(
                    &mut built.area_graph,
                    built.area_centroid[isolated.index()],
                    built.area_centroid[other.index()],
                );
                if added > 0 {
                    areas[isolated.index()].touching.insert(other);
                    areas[other.index()].touching.insert(isolated);
                }
                return added;
            }
        }
    }
    0
}

/// Add a synthesized edge in both directions, skipping directions that
/// already exist.
fn synthesize_pair(graph: &mut NtmGraph, a: ntm_core::NodeId, b: ntm_core::NodeId) -> usize {
    let length_km = graph.node(a).point.distance(graph.node(b).point) / 1000.0;
    let mut added = 0;
    for (from, to) in [(a, b), (b, a)] {
        if graph.edge_between(from, to).is_some() {
            continue;
        }
        let edge = LinkEdge {
            code: format!("repair:{}-{}", graph.node(from).code, graph.node(to).code),
            from,
            to,
            length_km,
            free_speed_kmh: CONNECTOR_SPEED_KMH,
            capacity_per_hour: CONNECTOR_CAPACITY_PER_HOUR,
            behaviour: TrafficBehaviourType::Ntm,
            weight: length_km / CONNECTOR_SPEED_KMH,
            cells: Vec::new(),
        };
        if graph.add_edge(edge).is_ok() {
            added += 1;
        }
    }
    added
}
