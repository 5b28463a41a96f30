//! Plain data row types written by output backends.

/// One vertex's flow state at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSnapshotRow {
    pub tick: u64,
    /// External code (zone code, `flow:…`, `cordon:…`).
    pub code: String,
    pub behaviour: &'static str,
    pub accumulated_cars: f64,
    /// Release rate, veh/h.
    pub demand: f64,
    /// Acceptance rate, veh/h; infinite for uncongestible vertices.
    pub supply: f64,
    /// Interpolated speed, km/h; `None` for non-diagram vertices.
    pub speed_kmh: Option<f64>,
}

/// One flow-link cell's occupancy at a snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowCellRow {
    pub tick: u64,
    pub link_code: String,
    /// Cell position, 0 = most upstream.
    pub cell_index: usize,
    pub accumulated_cars: f64,
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick: u64,
    pub unix_time_secs: i64,
    pub injected: f64,
    pub departed: f64,
    pub arrived: f64,
    pub completed: f64,
    pub total_accumulation: f64,
    pub skipped_nodes: u64,
}
