//! Input records, behaviour tags, graph edges, and flow-cell decomposition.

use ntm_core::Point2;
use ntm_flow::FdParameters;

// ── TrafficBehaviourType ──────────────────────────────────────────────────────

/// Role tag distinguishing how a node or link participates in the model.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrafficBehaviourType {
    /// Zone governed by the network transmission (fundamental-diagram) model.
    Ntm,
    /// Ordinary urban road.
    Road,
    /// High-speed, high-capacity link simulated with nested flow cells.
    Flow,
    /// Cordon feeder at the model boundary.
    Cordon,
    /// Zone centroid vertex.
    Centroid,
}

impl TrafficBehaviourType {
    /// Human-readable label for logs and CSV columns.
    pub fn as_str(self) -> &'static str {
        match self {
            TrafficBehaviourType::Ntm      => "ntm",
            TrafficBehaviourType::Road     => "road",
            TrafficBehaviourType::Flow     => "flow",
            TrafficBehaviourType::Cordon   => "cordon",
            TrafficBehaviourType::Centroid => "centroid",
        }
    }
}

impl std::fmt::Display for TrafficBehaviourType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Input records ─────────────────────────────────────────────────────────────

/// A raw node record from the (out-of-scope) network provider.
#[derive(Clone, Debug)]
pub struct NodeRecord {
    pub code: String,
    pub point: Point2,
}

/// A raw link record from the network provider.
///
/// `behaviour` arrives as ROAD for ordinary links and CORDON for boundary
/// connectors; [`promote_flow_links`] upgrades qualifying links to FLOW.
#[derive(Clone, Debug)]
pub struct LinkRecord {
    pub code: String,
    pub from: String,
    pub to: String,
    pub length_km: f64,
    pub free_speed_kmh: f64,
    pub capacity_per_hour: f64,
    pub lanes: f64,
    pub behaviour: TrafficBehaviourType,
}

/// Reclassify links that show highway behaviour as FLOW links.
///
/// A link is promoted when its free speed is at least `min_speed_kmh` AND
/// its capacity exceeds `min_capacity_per_hour`.  Returns the number of
/// promoted links.
pub fn promote_flow_links(links: &mut [LinkRecord], min_speed_kmh: f64, min_capacity_per_hour: f64) -> usize {
    let mut promoted = 0;
    for link in links.iter_mut() {
        if link.behaviour == TrafficBehaviourType::Road
            && link.free_speed_kmh >= min_speed_kmh
            && link.capacity_per_hour > min_capacity_per_hour
        {
            link.behaviour = TrafficBehaviourType::Flow;
            promoted += 1;
        }
    }
    promoted
}

// ── FlowCell ──────────────────────────────────────────────────────────────────

/// One sub-segment of a FLOW link, sized so a free-flow vehicle traverses
/// exactly one cell per tick.
#[derive(Clone, Debug)]
pub struct FlowCell {
    /// Cell length ℓ = free speed × Δt, km.
    pub length_km: f64,
    /// Capacity inherited from the parent link, veh/h.
    pub capacity_per_hour: f64,
    /// The cell's own fundamental diagram.
    pub params: FdParameters,
}

impl FlowCell {
    /// Decompose a FLOW link of length `length_km` into cells.
    ///
    /// Cell count N = round(L / ℓ) — round-to-nearest, not floor or ceil, so
    /// the discretization error stays within one cell length either way
    /// (|N·ℓ − L| ≤ ℓ).  A link shorter than half a cell still gets one cell.
    pub fn decompose(
        length_km: f64,
        free_speed_kmh: f64,
        capacity_per_hour: f64,
        dt_hours: f64,
    ) -> Vec<FlowCell> {
        let cell_length = free_speed_kmh * dt_hours;
        let count = ((length_km / cell_length).round() as usize).max(1);

        let params = FdParameters::from_area(free_speed_kmh, cell_length);
        // Per-km thresholds scaled to the cell, capacity forced to the
        // parent link's.
        let params = FdParameters {
            max_capacity_per_hour: capacity_per_hour,
            ..params
        };

        (0..count)
            .map(|_| FlowCell {
                length_km: cell_length,
                capacity_per_hour,
                params: params.clone(),
            })
            .collect()
    }
}

// ── LinkEdge ──────────────────────────────────────────────────────────────────

/// A directed edge in an [`NtmGraph`](crate::NtmGraph).
///
/// In the link graph the weight is physical length (km); in the area graph
/// it is travel time (hours).  FLOW edges in the area graph carry their cell
/// decomposition; everywhere else `cells` is empty.
#[derive(Clone, Debug)]
pub struct LinkEdge {
    pub code: String,
    pub from: ntm_core::NodeId,
    pub to: ntm_core::NodeId,
    pub length_km: f64,
    pub free_speed_kmh: f64,
    pub capacity_per_hour: f64,
    pub behaviour: TrafficBehaviourType,
    /// Shortest-path weight; see type-level docs for units per tier.
    pub weight: f64,
    /// Ordered cell decomposition (FLOW edges in the area graph only).
    pub cells: Vec<FlowCell>,
}

impl LinkEdge {
    /// Free-flow traversal time in hours.
    #[inline]
    pub fn travel_time_h(&self) -> f64 {
        self.length_km / self.free_speed_kmh
    }
}
