//! Two-tier graph construction.
//!
//! [`GraphBuilder::build`] turns raw node/link records plus the zone set into
//! the fine **link graph** (one vertex per physical endpoint, edges weighted
//! by length in km) and the coarse **area graph** (zone centroids, FLOW
//! endpoints, cordon feeders, edges weighted by travel time in hours).
//!
//! Coordinates are planar metres; link lengths and speeds stay in km and
//! km/h throughout.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use ntm_core::{AreaId, NodeId, Point2};
use ntm_geo::{find_area, Area, RoadSegment};

use crate::error::GraphResult;
use crate::graph::NtmGraph;
use crate::link::{FlowCell, LinkEdge, LinkRecord, NodeRecord, TrafficBehaviourType};

/// Capacity assigned to synthesized connector edges, veh/h.
pub const CONNECTOR_CAPACITY_PER_HOUR: f64 = 4000.0;
/// Free speed assigned to synthesized connector edges, km/h.
pub const CONNECTOR_SPEED_KMH: f64 = 70.0;
/// Straight-line centroid distance is inflated by this factor to approximate
/// the length of a real route between two zones.
pub const DETOUR_FACTOR: f64 = 1.3;

const METRES_PER_KM: f64 = 1000.0;

#[inline]
fn km(metres: f64) -> f64 {
    metres / METRES_PER_KM
}

/// The two graphs plus the centroid lookup tables the later phases need.
pub struct BuiltGraphs {
    /// Fine graph over physical endpoints; weight = length (km).
    pub link_graph: NtmGraph,
    /// Coarse graph the simulation runs on; weight = travel time (h).
    pub area_graph: NtmGraph,
    /// Per [`AreaId`]: the zone's centroid vertex in the link graph.
    pub link_centroid: Vec<NodeId>,
    /// Per [`AreaId`]: the zone's centroid vertex in the area graph.
    pub area_centroid: Vec<NodeId>,
}

impl BuiltGraphs {
    /// The area-graph centroid vertex of `area`.
    #[inline]
    pub fn centroid_of(&self, area: AreaId) -> NodeId {
        self.area_centroid[area.index()]
    }
}

/// Physical road segments for zone road-length accounting
/// (`ntm_geo::accumulate_road_lengths`), one per input link with resolvable
/// endpoints.  Unresolvable links are skipped here the same way the graph
/// build skips them.
pub fn road_segments(nodes: &[NodeRecord], links: &[LinkRecord]) -> Vec<RoadSegment> {
    let by_code: FxHashMap<&str, Point2> =
        nodes.iter().map(|n| (n.code.as_str(), n.point)).collect();

    let mut segments = Vec::with_capacity(links.len());
    for link in links {
        let (Some(&from), Some(&to)) =
            (by_code.get(link.from.as_str()), by_code.get(link.to.as_str()))
        else {
            debug!("link {:?} has an unresolvable endpoint; no road segment", link.code);
            continue;
        };
        segments.push(RoadSegment {
            line: geo::Line::new((from.x, from.y), (to.x, to.y)),
            length_km: link.length_km,
            lanes: link.lanes,
            free_speed_kmh: link.free_speed_kmh,
        });
    }
    segments
}

/// Builds both graph tiers from read-only input.
///
/// Zone adjacency must already be detected (see `ntm_geo::find_touching`);
/// FLOW promotion of the link records is the caller's choice and happens
/// before construction.
pub struct GraphBuilder<'a> {
    areas: &'a [Area],
    nodes: &'a [NodeRecord],
    links: &'a [LinkRecord],
}

impl<'a> GraphBuilder<'a> {
    pub fn new(areas: &'a [Area], nodes: &'a [NodeRecord], links: &'a [LinkRecord]) -> Self {
        Self { areas, nodes, links }
    }

    /// Construct both tiers.  `dt_hours` sizes the FLOW cells.
    ///
    /// Input records with unknown endpoints or duplicate codes are logged
    /// and skipped; they never abort the build.  Given stable input order
    /// the result is fully deterministic.
    pub fn build(&self, dt_hours: f64) -> GraphResult<BuiltGraphs> {
        let (link_graph, link_centroid) = self.build_link_graph()?;
        let (area_graph, area_centroid) = self.build_area_graph(&link_graph, dt_hours)?;
        Ok(BuiltGraphs { link_graph, area_graph, link_centroid, area_centroid })
    }

    // ── Fine tier ─────────────────────────────────────────────────────────

    fn build_link_graph(&self) -> GraphResult<(NtmGraph, Vec<NodeId>)> {
        let mut graph = NtmGraph::new();

        for record in self.nodes {
            let area = find_area(self.areas, record.point);
            match graph.add_node(&record.code, record.point, area, TrafficBehaviourType::Road) {
                Ok(_) => {}
                Err(err) => warn!("skipping node record: {err}"),
            }
        }

        for record in self.links {
            let Some((from, to)) = self.resolve(&graph, record) else {
                continue;
            };
            // The link's role propagates to its endpoints: FLOW endpoints
            // become flow joints, cordon endpoints outside every zone
            // become feeders.
            match record.behaviour {
                TrafficBehaviourType::Flow => {
                    graph.node_mut(from).behaviour = TrafficBehaviourType::Flow;
                    graph.node_mut(to).behaviour = TrafficBehaviourType::Flow;
                }
                TrafficBehaviourType::Cordon => {
                    for id in [from, to] {
                        let node = graph.node_mut(id);
                        if node.area.is_none() {
                            node.behaviour = TrafficBehaviourType::Cordon;
                        }
                    }
                }
                _ => {}
            }
            graph.add_edge(LinkEdge {
                code: record.code.clone(),
                from,
                to,
                length_km: record.length_km,
                free_speed_kmh: record.free_speed_kmh,
                capacity_per_hour: record.capacity_per_hour,
                behaviour: record.behaviour,
                weight: record.length_km,
                cells: Vec::new(),
            })?;
        }

        // Zone centroids join the fine tier too, stitched to every endpoint
        // inside the zone, so repair path queries can start at a centroid.
        let mut centroids = Vec::with_capacity(self.areas.len());
        let endpoint_count = graph.node_count();
        for area in self.areas {
            let cid = graph.add_node(
                format!("centroid:{}", area.code),
                area.centroid,
                Some(area.id),
                TrafficBehaviourType::Centroid,
            )?;
            centroids.push(cid);
            for idx in 0..endpoint_count {
                let node = NodeId(idx as u32);
                if graph.node(node).area != Some(area.id) {
                    continue;
                }
                let length_km = km(area.centroid.distance(graph.node(node).point));
                for (a, b) in [(cid, node), (node, cid)] {
                    let mut edge = connector_edge(&graph, a, b, length_km);
                    edge.weight = edge.length_km; // fine tier weighs by length
                    graph.add_edge(edge)?;
                }
            }
        }

        Ok((graph, centroids))
    }

    // ── Coarse tier ───────────────────────────────────────────────────────

    fn build_area_graph(
        &self,
        link_graph: &NtmGraph,
        dt_hours: f64,
    ) -> GraphResult<(NtmGraph, Vec<NodeId>)> {
        let mut graph = NtmGraph::new();

        // One NTM vertex per zone centroid.
        let mut centroids = Vec::with_capacity(self.areas.len());
        for area in self.areas {
            let cid = graph.add_node(
                area.code.clone(),
                area.centroid,
                Some(area.id),
                TrafficBehaviourType::Ntm,
            )?;
            centroids.push(cid);
        }

        // One FLOW vertex per FLOW-link endpoint, distinct from centroids
        // even when the endpoint sits inside a zone.
        let mut flow_nodes: FxHashMap<String, NodeId> = FxHashMap::default();
        for record in self.links {
            if record.behaviour != TrafficBehaviourType::Flow {
                continue;
            }
            for endpoint in [&record.from, &record.to] {
                if flow_nodes.contains_key(endpoint.as_str()) {
                    continue;
                }
                let Some(raw) = link_graph.node_by_code(endpoint) else {
                    continue;
                };
                let raw = link_graph.node(raw);
                let id = graph.add_node(
                    format!("flow:{endpoint}"),
                    raw.point,
                    raw.area,
                    TrafficBehaviourType::Flow,
                )?;
                flow_nodes.insert(endpoint.clone(), id);
            }
        }

        for record in self.links {
            match record.behaviour {
                TrafficBehaviourType::Flow => {
                    self.add_flow_edge(&mut graph, &flow_nodes, record, dt_hours)?;
                }
                TrafficBehaviourType::Road | TrafficBehaviourType::Cordon => {
                    self.add_road_edges(&mut graph, link_graph, &centroids, &flow_nodes, record)?;
                }
                _ => {}
            }
        }

        Ok((graph, centroids))
    }

    /// A FLOW link becomes one edge between its two flow vertices, carrying
    /// its cell decomposition.
    fn add_flow_edge(
        &self,
        graph: &mut NtmGraph,
        flow_nodes: &FxHashMap<String, NodeId>,
        record: &LinkRecord,
        dt_hours: f64,
    ) -> GraphResult<()> {
        let (Some(&from), Some(&to)) = (flow_nodes.get(&record.from), flow_nodes.get(&record.to))
        else {
            debug!("flow link {:?} dropped: endpoint missing from link graph", record.code);
            return Ok(());
        };
        let cells = FlowCell::decompose(
            record.length_km,
            record.free_speed_kmh,
            record.capacity_per_hour,
            dt_hours,
        );
        let edge = LinkEdge {
            code: record.code.clone(),
            from,
            to,
            length_km: record.length_km,
            free_speed_kmh: record.free_speed_kmh,
            capacity_per_hour: record.capacity_per_hour,
            behaviour: TrafficBehaviourType::Flow,
            weight: record.length_km / record.free_speed_kmh,
            cells,
        };
        graph.add_edge(edge)?;
        Ok(())
    }

    /// A ROAD/CORDON link contributes, depending on where its endpoints sit:
    /// an aggregate centroid-to-centroid edge (adjacent zones, first link
    /// wins), a cordon feeder edge (one endpoint outside every zone), or a
    /// connector stitching a FLOW vertex to the other endpoint's zone.
    fn add_road_edges(
        &self,
        graph: &mut NtmGraph,
        link_graph: &NtmGraph,
        centroids: &[NodeId],
        flow_nodes: &FxHashMap<String, NodeId>,
        record: &LinkRecord,
    ) -> GraphResult<()> {
        let Some((from, to)) = self.resolve(link_graph, record) else {
            return Ok(());
        };
        let area_from = link_graph.node(from).area;
        let area_to = link_graph.node(to).area;

        match (area_from, area_to) {
            (Some(a), Some(b)) if a != b => {
                if self.areas[a.index()].touching.contains(&b) {
                    self.add_aggregate_edge(graph, centroids, record, a, b)?;
                }
            }
            (Some(a), None) if record.behaviour == TrafficBehaviourType::Cordon => {
                self.add_cordon_edges(graph, link_graph, centroids, record, a, to)?;
            }
            (None, Some(b)) if record.behaviour == TrafficBehaviourType::Cordon => {
                self.add_cordon_edges(graph, link_graph, centroids, record, b, from)?;
            }
            _ => {}
        }

        // Any ROAD/CORDON endpoint coinciding with a FLOW vertex stitches
        // that vertex to the other endpoint's zone.
        for (flow_code, other) in [(&record.from, to), (&record.to, from)] {
            let Some(&flow_id) = flow_nodes.get(flow_code.as_str()) else {
                continue;
            };
            let Some(area) = link_graph.node(other).area else {
                continue;
            };
            let centroid = centroids[area.index()];
            let length_km = km(graph.node(flow_id).point.distance(graph.node(centroid).point));
            for (a, b) in [(flow_id, centroid), (centroid, flow_id)] {
                if graph.edge_between(a, b).is_none() {
                    graph.add_edge(connector_edge(graph, a, b, length_km))?;
                }
            }
        }
        Ok(())
    }

    /// One aggregate edge per ordered pair of adjacent zones; the first
    /// qualifying link sets the capacity, later links are ignored (no
    /// capacity summation).
    fn add_aggregate_edge(
        &self,
        graph: &mut NtmGraph,
        centroids: &[NodeId],
        record: &LinkRecord,
        a: AreaId,
        b: AreaId,
    ) -> GraphResult<()> {
        let (ca, cb) = (centroids[a.index()], centroids[b.index()]);
        if graph.edge_between(ca, cb).is_some() {
            return Ok(());
        }
        let area_a = &self.areas[a.index()];
        let area_b = &self.areas[b.index()];
        let distance_km = DETOUR_FACTOR * km(area_a.centroid.distance(area_b.centroid));
        // Half the route at each zone's average speed.
        let time_h = 0.5 * distance_km / area_a.avg_speed_kmh + 0.5 * distance_km / area_b.avg_speed_kmh;
        graph.add_edge(LinkEdge {
            code: format!("agg:{}-{}", area_a.code, area_b.code),
            from: ca,
            to: cb,
            length_km: distance_km,
            free_speed_kmh: distance_km / time_h,
            capacity_per_hour: record.capacity_per_hour,
            behaviour: TrafficBehaviourType::Ntm,
            weight: time_h,
            cells: Vec::new(),
        })?;
        Ok(())
    }

    /// A cordon link's outside endpoint becomes a feeder vertex tied to the
    /// inside endpoint's zone in both directions.
    fn add_cordon_edges(
        &self,
        graph: &mut NtmGraph,
        link_graph: &NtmGraph,
        centroids: &[NodeId],
        record: &LinkRecord,
        inside: AreaId,
        outside: NodeId,
    ) -> GraphResult<()> {
        let outside = link_graph.node(outside);
        let feeder = match graph.node_by_code(&format!("cordon:{}", outside.code)) {
            Some(id) => id,
            None => graph.add_node(
                format!("cordon:{}", outside.code),
                outside.point,
                None,
                TrafficBehaviourType::Cordon,
            )?,
        };
        let centroid = centroids[inside.index()];
        for (from, to) in [(feeder, centroid), (centroid, feeder)] {
            if graph.edge_between(from, to).is_some() {
                continue;
            }
            graph.add_edge(LinkEdge {
                code: format!("cordon:{}:{}", record.code, if from == feeder { "in" } else { "out" }),
                from,
                to,
                length_km: record.length_km,
                free_speed_kmh: record.free_speed_kmh,
                capacity_per_hour: record.capacity_per_hour,
                behaviour: TrafficBehaviourType::Cordon,
                weight: record.length_km / record.free_speed_kmh,
                cells: Vec::new(),
            })?;
        }
        Ok(())
    }

    /// Resolve a record's endpoints in `graph`, logging and skipping records
    /// that reference unknown codes.
    fn resolve(&self, graph: &NtmGraph, record: &LinkRecord) -> Option<(NodeId, NodeId)> {
        let from = graph.node_by_code(&record.from);
        let to = graph.node_by_code(&record.to);
        match (from, to) {
            (Some(f), Some(t)) => Some((f, t)),
            _ => {
                let missing = if from.is_none() { &record.from } else { &record.to };
                warn!("skipping link {:?}: unknown endpoint {:?}", record.code, missing);
                None
            }
        }
    }
}

/// A synthesized connector edge between `from` and `to`.
pub(crate) fn connector_edge(graph: &NtmGraph, from: NodeId, to: NodeId, length_km: f64) -> LinkEdge {
    LinkEdge {
        code: format!("conn:{}-{}", graph.node(from).code, graph.node(to).code),
        from,
        to,
        length_km,
        free_speed_kmh: CONNECTOR_SPEED_KMH,
        capacity_per_hour: CONNECTOR_CAPACITY_PER_HOUR,
        behaviour: TrafficBehaviourType::Road,
        weight: length_km / CONNECTOR_SPEED_KMH,
        cells: Vec::new(),
    }
}
