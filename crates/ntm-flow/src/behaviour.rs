//! Per-node dynamic flow state, variant by traffic behaviour type.
//!
//! Rather than an inheritance tree of cell-behaviour classes, this is one
//! struct with a [`BehaviourKind`] tag chosen at construction: the
//! orchestrator owns one `CellBehaviour` per area-graph node and mutates it
//! exclusively during a tick.

use rustc_hash::FxHashMap;

use ntm_core::NodeId;

use crate::diagram;
use crate::params::FdParameters;

/// Unrestrained border capacity (veh/h) used when no capacity-restraint
/// table is supplied for a neighbour.
pub const UNRESTRAINED_CAPACITY: f64 = 99_999.0;

// ── Per-destination load ──────────────────────────────────────────────────────

/// Dynamic trip bookkeeping for one destination at one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DestinationLoad {
    /// Vehicles currently held here that are bound for this destination.
    pub accumulated: f64,
    /// The subset of `accumulated` still passing through (not yet arrived).
    pub passing: f64,
    /// Vehicles that neighbours want to push here for this destination,
    /// filled by the unconstrained distribution pass and consumed by the
    /// supply-constrained correction.
    pub demand_to_enter: f64,
}

// ── FlowState ─────────────────────────────────────────────────────────────────

/// Mutable per-tick flow fields shared by every behaviour variant.
#[derive(Clone, Debug, Default)]
pub struct FlowState {
    /// Vehicles currently inside, ≥ 0.
    pub accumulated_cars: f64,
    /// Release rate computed by the evaluate phase, veh/h.
    pub demand: f64,
    /// Acceptance rate computed by the evaluate phase, veh/h.
    pub supply: f64,
    /// Total vehicles neighbours want to push here this tick.
    pub demand_to_enter: f64,
    /// Vehicles accepted this tick (including trips ending here).
    pub arrivals: f64,
    /// Vehicles released this tick.
    pub departures: f64,
    /// Border capacity towards each neighbour, veh/h.
    pub border_capacity: FxHashMap<NodeId, f64>,
    /// Vehicles offered towards each neighbour this tick (diagnostic).
    pub border_demand: FxHashMap<NodeId, f64>,
    /// Per-destination dynamic loads.
    pub by_destination: FxHashMap<NodeId, DestinationLoad>,
}

impl FlowState {
    /// Border capacity towards `neighbour`, falling back to the
    /// unrestrained default.
    #[inline]
    pub fn border_capacity_to(&self, neighbour: NodeId) -> f64 {
        self.border_capacity
            .get(&neighbour)
            .copied()
            .unwrap_or(UNRESTRAINED_CAPACITY)
    }

    /// Reset the fields that are recomputed from scratch each tick.
    /// Accumulation and destination loads persist across ticks.
    pub fn start_tick(&mut self) {
        self.demand = 0.0;
        self.supply = 0.0;
        self.demand_to_enter = 0.0;
        self.arrivals = 0.0;
        self.departures = 0.0;
        self.border_demand.clear();
        for load in self.by_destination.values_mut() {
            load.demand_to_enter = 0.0;
        }
    }
}

// ── CellBehaviour ─────────────────────────────────────────────────────────────

/// Behaviour variant tag, fixed at construction.
#[derive(Clone, Debug)]
pub enum BehaviourKind {
    /// Zone governed by the fundamental diagram.
    Ntm(FdParameters),
    /// Endpoint of a cell-transmission flow link; the link's cells carry
    /// the capacity constraints, the node itself just forwards.
    Flow,
    /// Cordon feeder: injects external demand, absorbs arriving traffic
    /// without a congestion model.
    Cordon,
    /// Plain road joint: forwards whatever it holds.
    Road,
}

/// One node's dynamic flow state plus its fixed behaviour variant.
#[derive(Clone, Debug)]
pub struct CellBehaviour {
    pub kind: BehaviourKind,
    pub state: FlowState,
}

impl CellBehaviour {
    pub fn new(kind: BehaviourKind) -> Self {
        Self { kind, state: FlowState::default() }
    }

    /// Evaluate phase: set `demand`/`supply` from the current accumulation.
    ///
    /// `dt_hours` converts "release everything" into a rate for the
    /// non-diagram variants.
    pub fn evaluate(&mut self, dt_hours: f64) {
        let n = self.state.accumulated_cars;
        match &self.kind {
            BehaviourKind::Ntm(p) => {
                self.state.demand = diagram::demand(n, p);
                self.state.supply = diagram::supply(n, p);
            }
            // No congestion model: want to release everything held this
            // tick, accept without limit (border capacity still applies).
            BehaviourKind::Flow | BehaviourKind::Cordon | BehaviourKind::Road => {
                self.state.demand = n / dt_hours;
                self.state.supply = f64::INFINITY;
            }
        }
    }

    /// The fundamental-diagram parameters, for NTM nodes only.
    pub fn fd_parameters(&self) -> Option<&FdParameters> {
        match &self.kind {
            BehaviourKind::Ntm(p) => Some(p),
            _ => None,
        }
    }

    /// Current zone speed (km/h) for reporting: interpolates between free
    /// speed and zero as accumulation approaches jam.  Non-diagram variants
    /// report their free-flow behaviour as unknown (`None`).
    pub fn current_speed_kmh(&self) -> Option<f64> {
        match &self.kind {
            BehaviourKind::Ntm(p) => {
                let n = self.state.accumulated_cars;
                if n <= 0.0 {
                    return Some(p.free_speed_kmh);
                }
                // speed = production · roadLength / n  (veh/h · km / veh)
                let prod = diagram::production(n, p);
                if p.road_length_km.is_finite() {
                    Some((prod * p.road_length_km / n).min(p.free_speed_kmh))
                } else {
                    Some(p.free_speed_kmh)
                }
            }
            _ => None,
        }
    }
}
