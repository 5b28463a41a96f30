//! Read-only per-tick state snapshots for external consumers.

use ntm_core::{NodeId, Tick};
use ntm_graph::TrafficBehaviourType;

/// One node's flow state at a snapshot instant.
#[derive(Clone, Debug)]
pub struct NodeSnapshot {
    pub tick: Tick,
    pub node: NodeId,
    /// External code of the node (zone code, `flow:…`, `cordon:…`).
    pub code: String,
    pub behaviour: TrafficBehaviourType,
    pub accumulated_cars: f64,
    /// Release rate from the evaluate phase, veh/h.
    pub demand: f64,
    /// Acceptance rate from the evaluate phase, veh/h (may be infinite for
    /// non-diagram nodes).
    pub supply: f64,
    /// Interpolated zone speed, km/h; `None` for non-diagram nodes.
    pub speed_kmh: Option<f64>,
}

/// One flow edge's cell occupancy at a snapshot instant.
#[derive(Clone, Debug)]
pub struct FlowEdgeSnapshot {
    pub tick: Tick,
    /// External code of the flow link.
    pub code: String,
    /// Vehicles per cell, upstream to downstream.
    pub cell_accumulation: Vec<f64>,
}
