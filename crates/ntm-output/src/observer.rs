//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use ntm_core::{NtmSettings, Tick};
use ntm_sim::{FlowEdgeSnapshot, NodeSnapshot, SimObserver, TickSummary};

use crate::row::{FlowCellRow, TickSummaryRow, ZoneSnapshotRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes zone snapshots and tick summaries to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer: W,
    start_unix_secs: i64,
    tick_duration_secs: u32,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `settings` for
    /// wall-clock conversion.
    pub fn new(writer: W, settings: &NtmSettings) -> Self {
        Self {
            writer,
            start_unix_secs: settings.start_unix_secs,
            tick_duration_secs: settings.tick_duration_secs,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn unix_time(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64 * self.tick_duration_secs as i64
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick: summary.tick.0,
            unix_time_secs: self.unix_time(summary.tick),
            injected: summary.injected,
            departed: summary.departed,
            arrived: summary.arrived,
            completed: summary.completed,
            total_accumulation: summary.total_accumulation,
            skipped_nodes: summary.skipped.len() as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, nodes: &[NodeSnapshot], flow_edges: &[FlowEdgeSnapshot]) {
        let rows: Vec<ZoneSnapshotRow> = nodes
            .iter()
            .map(|n| ZoneSnapshotRow {
                tick: n.tick.0,
                code: n.code.clone(),
                behaviour: n.behaviour.as_str(),
                accumulated_cars: n.accumulated_cars,
                demand: n.demand,
                supply: n.supply,
                speed_kmh: n.speed_kmh,
            })
            .collect();
        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }

        let cell_rows: Vec<FlowCellRow> = flow_edges
            .iter()
            .flat_map(|edge| {
                edge.cell_accumulation.iter().enumerate().map(|(i, &n)| FlowCellRow {
                    tick: edge.tick.0,
                    link_code: edge.code.clone(),
                    cell_index: i,
                    accumulated_cars: n,
                })
            })
            .collect();
        if !cell_rows.is_empty() {
            let result = self.writer.write_flow_cells(&cell_rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
