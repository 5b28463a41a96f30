//! The `NtmSim` orchestrator and its five-phase tick loop.

use log::{debug, warn};
use rustc_hash::FxHashMap;

use ntm_core::{EdgeId, NodeId, NtmSettings, SimClock, Tick};
use ntm_demand::{CapacityRestraint, DepartureTimeProfile, TripDemand};
use ntm_flow::{BehaviourKind, CellBehaviour, FdParameters};
use ntm_geo::Area;
use ntm_graph::{NtmGraph, TrafficBehaviourType};
use ntm_routes::RouteFractions;

use crate::observer::SimObserver;
use crate::outcome::{NodeTickOutcome, SkipReason, TickSummary};
use crate::snapshot::{FlowEdgeSnapshot, NodeSnapshot};

// ── Offers ────────────────────────────────────────────────────────────────────

/// Where vehicles are held: an area-graph vertex or one cell of a flow edge.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Endpoint {
    Node(NodeId),
    Cell(EdgeId, usize),
}

/// One directed transfer proposal built by the distribution phase, in veh/h.
/// The correction phase scales it; the commit phase moves the vehicles.
struct Offer {
    from: Endpoint,
    to: Endpoint,
    destination: NodeId,
    rate: f64,
    /// `(holder, neighbour)` pair whose border capacity constrains this
    /// offer; `None` for intra-link cell hops.
    border: Option<(NodeId, NodeId)>,
}

/// An OD demand entry resolved to area-graph vertices.
struct ResolvedOd {
    origin: NodeId,
    destination: NodeId,
    trips: f64,
}

// ── NtmSim ────────────────────────────────────────────────────────────────────

/// The macroscopic flow simulator.
///
/// Owns the area graph, the frozen route-fraction tables, and one
/// [`CellBehaviour`] per vertex (plus one per flow-edge cell).  Each tick
/// runs five phases in order, with phase boundaries acting as barriers:
///
/// 1. **Inject** scheduled OD demand into origin accumulations.
/// 2. **Evaluate** demand/supply per vertex from the fundamental diagram.
/// 3. **Distribute** release rates over neighbours via route fractions,
///    unconstrained.
/// 4. **Correct** every proposed inflow by `min(1, supply/demandToEnter)`
///    and by border capacity.
/// 5. **Commit** the accepted transfers and advance the clock.
///
/// A vertex whose state fails validation is skipped for the tick with a
/// recorded reason; the tick always completes for the rest of the network.
pub struct NtmSim {
    graph: NtmGraph,
    routes: RouteFractions,
    behaviours: Vec<CellBehaviour>,
    /// Cell pipelines of flow edges, upstream to downstream.
    flow_cells: FxHashMap<EdgeId, Vec<CellBehaviour>>,
    demand: Vec<ResolvedOd>,
    profile: DepartureTimeProfile,
    /// Dedicated pool sized by `settings.num_threads`; `None` runs the
    /// evaluate phase on the global Rayon pool.
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
    pub clock: SimClock,
    pub settings: NtmSettings,
}

impl NtmSim {
    /// Assemble a simulator from the built area graph and its companions.
    ///
    /// Demand entries whose codes resolve to no vertex (or to the same
    /// vertex twice) are logged and dropped.  NTM vertices draw their
    /// diagram parameters from their zone's road length and average speed;
    /// override per vertex with [`set_fd_parameters`](Self::set_fd_parameters)
    /// before running.
    pub fn new(
        graph: NtmGraph,
        areas: &[Area],
        routes: RouteFractions,
        demand: &TripDemand,
        profile: DepartureTimeProfile,
        settings: NtmSettings,
    ) -> NtmSim {
        let mut behaviours = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let kind = match node.behaviour {
                TrafficBehaviourType::Ntm => match node.area {
                    Some(area) => {
                        let area = &areas[area.index()];
                        BehaviourKind::Ntm(FdParameters::from_area(
                            area.avg_speed_kmh,
                            area.road_length_km,
                        ))
                    }
                    None => {
                        warn!("NTM vertex {:?} has no zone; treating as road joint", node.code);
                        BehaviourKind::Road
                    }
                },
                TrafficBehaviourType::Flow => BehaviourKind::Flow,
                TrafficBehaviourType::Cordon => BehaviourKind::Cordon,
                TrafficBehaviourType::Road | TrafficBehaviourType::Centroid => BehaviourKind::Road,
            };
            behaviours.push(CellBehaviour::new(kind));
        }

        // Border capacity towards each neighbour defaults to the connecting
        // edge's capacity.
        for edge in graph.edges() {
            behaviours[edge.from.index()]
                .state
                .border_capacity
                .insert(edge.to, edge.capacity_per_hour);
        }

        let mut flow_cells = FxHashMap::default();
        for (idx, edge) in graph.edges().enumerate() {
            if edge.cells.is_empty() {
                continue;
            }
            let cells: Vec<CellBehaviour> = edge
                .cells
                .iter()
                .map(|c| CellBehaviour::new(BehaviourKind::Ntm(c.params.clone())))
                .collect();
            flow_cells.insert(EdgeId(idx as u32), cells);
        }

        let mut resolved = Vec::with_capacity(demand.len());
        for record in demand.records() {
            let (origin, destination) =
                match (graph.node_by_code(&record.origin), graph.node_by_code(&record.destination)) {
                    (Some(o), Some(d)) => (o, d),
                    _ => {
                        warn!(
                            "dropping OD entry {} -> {}: unknown code",
                            record.origin, record.destination
                        );
                        continue;
                    }
                };
            if origin == destination {
                debug!("dropping self-directed OD entry at {}", record.origin);
                continue;
            }
            resolved.push(ResolvedOd { origin, destination, trips: record.trips });
        }

        #[cfg(feature = "parallel")]
        let pool = settings.num_threads.and_then(|n| {
            match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!("could not build a {n}-thread pool: {err}; using the global pool");
                    None
                }
            }
        });

        let clock = settings.make_clock();
        NtmSim {
            graph,
            routes,
            behaviours,
            flow_cells,
            demand: resolved,
            profile,
            #[cfg(feature = "parallel")]
            pool,
            clock,
            settings,
        }
    }

    // ── Accessors and calibration hooks ───────────────────────────────────

    pub fn graph(&self) -> &NtmGraph {
        &self.graph
    }

    pub fn behaviour(&self, node: NodeId) -> &CellBehaviour {
        &self.behaviours[node.index()]
    }

    /// Replace an NTM vertex's diagram parameters (calibration hook).
    /// Ignored with a warning for non-NTM vertices.
    pub fn set_fd_parameters(&mut self, node: NodeId, params: FdParameters) {
        match &mut self.behaviours[node.index()].kind {
            BehaviourKind::Ntm(p) => *p = params,
            _ => warn!("vertex {node} is not NTM; parameters ignored"),
        }
    }

    /// Restrict the border capacity from `holder` towards `neighbour`.
    pub fn set_border_capacity(&mut self, holder: NodeId, neighbour: NodeId, veh_per_hour: f64) {
        self.behaviours[holder.index()]
            .state
            .border_capacity
            .insert(neighbour, veh_per_hour);
    }

    /// Resolve and apply a loaded capacity-restraint table.  Rows whose
    /// codes resolve to no vertex are logged and skipped.
    pub fn apply_capacity_restraints(&mut self, restraints: &[CapacityRestraint]) {
        for restraint in restraints {
            match (self.graph.node_by_code(&restraint.from), self.graph.node_by_code(&restraint.to))
            {
                (Some(from), Some(to)) => {
                    self.set_border_capacity(from, to, restraint.capacity_per_hour);
                }
                _ => warn!(
                    "dropping capacity restraint {} -> {}: unknown code",
                    restraint.from, restraint.to
                ),
            }
        }
    }

    /// Put vehicles bound for `destination` directly into `node`'s
    /// accumulation, outside the OD schedule.
    pub fn inject(&mut self, node: NodeId, destination: NodeId, vehicles: f64) {
        let state = &mut self.behaviours[node.index()].state;
        state.accumulated_cars += vehicles;
        let load = state.by_destination.entry(destination).or_default();
        load.accumulated += vehicles;
        load.passing += vehicles;
    }

    // ── Run loop ──────────────────────────────────────────────────────────

    /// Run from the current tick to `settings.end_tick()`, invoking the
    /// observer at every boundary.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) {
        loop {
            let now = self.clock.current_tick;
            if now >= self.settings.end_tick() {
                break;
            }
            observer.on_tick_start(now);
            let summary = self.step(observer);
            observer.on_tick_end(&summary);
            if self.settings.snapshot_interval_ticks > 0
                && now.0.is_multiple_of(self.settings.snapshot_interval_ticks)
            {
                let (nodes, flow_edges) = self.snapshot(now);
                observer.on_snapshot(&nodes, &flow_edges);
            }
            // Rescheduling is unconditional: skipped vertices never stall
            // the clock.
            self.clock.advance();
        }
        observer.on_sim_end(self.clock.current_tick);
    }

    /// Execute one full tick (all five phases) without advancing the clock.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> TickSummary {
        let now = self.clock.current_tick;
        let dt = self.clock.dt_hours();
        let mut summary = TickSummary { tick: now, ..TickSummary::default() };

        // ── Phase 0: reset transient per-tick fields ──────────────────────
        for behaviour in &mut self.behaviours {
            behaviour.state.start_tick();
        }
        for cells in self.flow_cells.values_mut() {
            for cell in cells {
                cell.state.start_tick();
            }
        }

        // ── Phase 1: inject scheduled demand ──────────────────────────────
        let fraction = self.profile.fraction_for_tick(&self.clock);
        if fraction > 0.0 {
            for i in 0..self.demand.len() {
                let vehicles = self.demand[i].trips * fraction;
                if vehicles <= 0.0 {
                    continue;
                }
                let (origin, destination) = (self.demand[i].origin, self.demand[i].destination);
                self.inject(origin, destination, vehicles);
                summary.injected += vehicles;
            }
        }

        // ── Phase 2: evaluate demand/supply ───────────────────────────────
        //
        // Validation first, sequentially, so a vertex with corrupt state is
        // skipped rather than poisoning the tick.  The diagram evaluation
        // itself is per-vertex independent and may run on the Rayon pool.
        let outcomes: Vec<NodeTickOutcome> =
            self.behaviours.iter().map(validate).collect();
        for (idx, outcome) in outcomes.iter().enumerate() {
            if let NodeTickOutcome::Skipped(reason) = outcome {
                let node = NodeId(idx as u32);
                observer.on_node_skipped(now, node, *reason);
                summary.skipped.push((node, *reason));
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            for (behaviour, outcome) in self.behaviours.iter_mut().zip(&outcomes) {
                if *outcome == NodeTickOutcome::Updated {
                    behaviour.evaluate(dt);
                }
            }
        }
        #[cfg(feature = "parallel")]
        match &self.pool {
            Some(pool) => pool.install(|| evaluate_parallel(&mut self.behaviours, &outcomes, dt)),
            None => evaluate_parallel(&mut self.behaviours, &outcomes, dt),
        }
        for cells in self.flow_cells.values_mut() {
            for cell in cells {
                cell.evaluate(dt);
            }
        }

        // ── Phase 3: unconstrained distribution ───────────────────────────
        let offers = self.build_offers(&outcomes);
        for offer in &offers {
            if let Some((holder, neighbour)) = offer.border {
                *self.behaviours[holder.index()]
                    .state
                    .border_demand
                    .entry(neighbour)
                    .or_insert(0.0) += offer.rate;
            }
            match offer.to {
                Endpoint::Node(n) => {
                    let state = &mut self.behaviours[n.index()].state;
                    state.demand_to_enter += offer.rate;
                    state.by_destination.entry(offer.destination).or_default().demand_to_enter +=
                        offer.rate;
                }
                Endpoint::Cell(e, i) => {
                    let state = &mut self.flow_cells.get_mut(&e).unwrap()[i].state;
                    state.demand_to_enter += offer.rate;
                    state.by_destination.entry(offer.destination).or_default().demand_to_enter +=
                        offer.rate;
                }
            }
        }

        // ── Phases 4+5: supply-constrained correction, then commit ────────
        for offer in &offers {
            let accept = self.acceptance_factor(offer);
            let vehicles = offer.rate * accept * dt;
            if vehicles <= 0.0 {
                continue;
            }
            let moved = self.withdraw(offer.from, offer.destination, vehicles);
            if moved <= 0.0 {
                continue;
            }
            if matches!(offer.from, Endpoint::Node(_)) {
                summary.departed += moved;
            }
            if matches!(offer.to, Endpoint::Node(_)) {
                summary.arrived += moved;
            }
            match offer.to {
                Endpoint::Node(n) if n == offer.destination => {
                    // Trip complete: absorbed at the destination.
                    let state = &mut self.behaviours[n.index()].state;
                    state.arrivals += moved;
                    summary.completed += moved;
                }
                to => self.deposit(to, offer.destination, moved),
            }
        }

        summary.total_accumulation = self
            .behaviours
            .iter()
            .map(|b| b.state.accumulated_cars)
            .chain(
                self.flow_cells
                    .values()
                    .flat_map(|cells| cells.iter().map(|c| c.state.accumulated_cars)),
            )
            .sum();
        summary
    }

    // ── Phase helpers ─────────────────────────────────────────────────────

    /// Build all transfer proposals for the tick (read-only pass).
    fn build_offers(&self, outcomes: &[NodeTickOutcome]) -> Vec<Offer> {
        let mut offers = Vec::new();

        for (idx, behaviour) in self.behaviours.iter().enumerate() {
            if outcomes[idx] != NodeTickOutcome::Updated {
                continue;
            }
            let node = NodeId(idx as u32);
            let state = &behaviour.state;
            if state.accumulated_cars <= 0.0 || state.demand <= 0.0 {
                continue;
            }

            // Deterministic destination order.
            let mut destinations: Vec<NodeId> = state.by_destination.keys().copied().collect();
            destinations.sort_unstable();

            for destination in destinations {
                let load = state.by_destination[&destination];
                if load.passing <= 0.0 {
                    continue;
                }
                // This destination's claim on the release rate.
                let rate_for_destination =
                    state.demand * load.passing / state.accumulated_cars;

                let Some(shares) = self.routes.shares(node, destination) else {
                    continue; // unreachable destination: vehicles wait
                };
                let mut neighbours: Vec<(NodeId, f64)> =
                    shares.iter().map(|(&n, &s)| (n, s)).collect();
                neighbours.sort_unstable_by_key(|&(n, _)| n);

                for (neighbour, share) in neighbours {
                    let rate = rate_for_destination * share;
                    if rate <= 0.0 {
                        continue;
                    }
                    let to = match self.graph.edge_between(node, neighbour) {
                        Some(e) if !self.graph.edge(e).cells.is_empty() => Endpoint::Cell(e, 0),
                        _ => Endpoint::Node(neighbour),
                    };
                    offers.push(Offer {
                        from: Endpoint::Node(node),
                        to,
                        destination,
                        rate,
                        border: Some((node, neighbour)),
                    });
                }
            }
        }

        // Flow-edge pipelines: each cell offers everything it holds to its
        // downstream cell; the last cell offers to the edge's head vertex.
        let mut edges: Vec<EdgeId> = self.flow_cells.keys().copied().collect();
        edges.sort_unstable();
        for eid in edges {
            let cells = &self.flow_cells[&eid];
            let head = self.graph.edge(eid).to;
            for (i, cell) in cells.iter().enumerate() {
                let state = &cell.state;
                if state.accumulated_cars <= 0.0 || state.demand <= 0.0 {
                    continue;
                }
                let to = if i + 1 < cells.len() {
                    Endpoint::Cell(eid, i + 1)
                } else {
                    Endpoint::Node(head)
                };
                let mut destinations: Vec<NodeId> = state.by_destination.keys().copied().collect();
                destinations.sort_unstable();
                for destination in destinations {
                    let load = state.by_destination[&destination];
                    if load.passing <= 0.0 {
                        continue;
                    }
                    let rate = state.demand * load.passing / state.accumulated_cars;
                    if rate <= 0.0 {
                        continue;
                    }
                    offers.push(Offer {
                        from: Endpoint::Cell(eid, i),
                        to,
                        destination,
                        rate,
                        border: None,
                    });
                }
            }
        }

        offers
    }

    /// Combined correction factor for one offer: the receiver's
    /// `min(1, supply / demandToEnter)` times the sender-side border
    /// restraint.
    fn acceptance_factor(&self, offer: &Offer) -> f64 {
        let state = match offer.to {
            Endpoint::Node(n) => &self.behaviours[n.index()].state,
            Endpoint::Cell(e, i) => &self.flow_cells[&e][i].state,
        };
        let mut factor = if state.demand_to_enter > 0.0 && state.supply.is_finite() {
            (state.supply / state.demand_to_enter).min(1.0)
        } else {
            1.0
        };

        if let Some((holder, neighbour)) = offer.border {
            let holder = &self.behaviours[holder.index()].state;
            let offered = holder.border_demand.get(&neighbour).copied().unwrap_or(0.0);
            let cap = holder.border_capacity_to(neighbour);
            if offered > cap {
                factor *= cap / offered;
            }
        }
        factor
    }

    /// Remove up to `vehicles` bound for `destination` from `from`; returns
    /// the amount actually removed (never below what is held).
    fn withdraw(&mut self, from: Endpoint, destination: NodeId, vehicles: f64) -> f64 {
        let state = match from {
            Endpoint::Node(n) => &mut self.behaviours[n.index()].state,
            Endpoint::Cell(e, i) => &mut self.flow_cells.get_mut(&e).unwrap()[i].state,
        };
        let Some(load) = state.by_destination.get_mut(&destination) else {
            return 0.0;
        };
        let moved = vehicles.min(load.accumulated).min(load.passing).max(0.0);
        load.accumulated -= moved;
        load.passing -= moved;
        state.accumulated_cars = (state.accumulated_cars - moved).max(0.0);
        state.departures += moved;
        moved
    }

    /// Add `vehicles` bound for `destination` into `to`.
    fn deposit(&mut self, to: Endpoint, destination: NodeId, vehicles: f64) {
        let state = match to {
            Endpoint::Node(n) => &mut self.behaviours[n.index()].state,
            Endpoint::Cell(e, i) => &mut self.flow_cells.get_mut(&e).unwrap()[i].state,
        };
        state.accumulated_cars += vehicles;
        state.arrivals += vehicles;
        let load = state.by_destination.entry(destination).or_default();
        load.accumulated += vehicles;
        load.passing += vehicles;
    }

    /// Build read-only snapshots of every vertex and flow edge.
    pub fn snapshot(&self, tick: Tick) -> (Vec<NodeSnapshot>, Vec<FlowEdgeSnapshot>) {
        let nodes = self
            .graph
            .nodes()
            .map(|node| {
                let behaviour = &self.behaviours[node.id.index()];
                NodeSnapshot {
                    tick,
                    node: node.id,
                    code: node.code.clone(),
                    behaviour: node.behaviour,
                    accumulated_cars: behaviour.state.accumulated_cars,
                    demand: behaviour.state.demand,
                    supply: behaviour.state.supply,
                    speed_kmh: behaviour.current_speed_kmh(),
                }
            })
            .collect();

        let mut edges: Vec<EdgeId> = self.flow_cells.keys().copied().collect();
        edges.sort_unstable();
        let flow_edges = edges
            .into_iter()
            .map(|eid| FlowEdgeSnapshot {
                tick,
                code: self.graph.edge(eid).code.clone(),
                cell_accumulation: self.flow_cells[&eid]
                    .iter()
                    .map(|c| c.state.accumulated_cars)
                    .collect(),
            })
            .collect();

        (nodes, flow_edges)
    }
}

#[cfg(feature = "parallel")]
fn evaluate_parallel(behaviours: &mut [CellBehaviour], outcomes: &[NodeTickOutcome], dt: f64) {
    use rayon::prelude::*;
    behaviours
        .par_iter_mut()
        .zip(outcomes.par_iter())
        .for_each(|(behaviour, outcome)| {
            if *outcome == NodeTickOutcome::Updated {
                behaviour.evaluate(dt);
            }
        });
}

/// Check a vertex's state before the tick touches it.
fn validate(behaviour: &CellBehaviour) -> NodeTickOutcome {
    let state = &behaviour.state;
    if !state.accumulated_cars.is_finite() {
        return NodeTickOutcome::Skipped(SkipReason::NonFiniteState);
    }
    if state.accumulated_cars < -1e-9 {
        return NodeTickOutcome::Skipped(SkipReason::NegativeAccumulation);
    }
    NodeTickOutcome::Updated
}
