//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `zone_snapshots.csv`
//! - `flow_cells.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{FlowCellRow, OutputResult, TickSummaryRow, ZoneSnapshotRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    flow_cells: Writer<File>,
    summaries: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("zone_snapshots.csv"))?;
        snapshots.write_record([
            "tick",
            "code",
            "behaviour",
            "accumulated_cars",
            "demand",
            "supply",
            "speed_kmh",
        ])?;

        let mut flow_cells = Writer::from_path(dir.join("flow_cells.csv"))?;
        flow_cells.write_record(["tick", "link_code", "cell_index", "accumulated_cars"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "unix_time_secs",
            "injected",
            "departed",
            "arrived",
            "completed",
            "total_accumulation",
            "skipped_nodes",
        ])?;

        Ok(Self { snapshots, flow_cells, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[ZoneSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.code.clone(),
                row.behaviour.to_string(),
                row.accumulated_cars.to_string(),
                row.demand.to_string(),
                row.supply.to_string(),
                row.speed_kmh.map(|s| s.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn write_flow_cells(&mut self, rows: &[FlowCellRow]) -> OutputResult<()> {
        for row in rows {
            self.flow_cells.write_record(&[
                row.tick.to_string(),
                row.link_code.clone(),
                row.cell_index.to_string(),
                row.accumulated_cars.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.injected.to_string(),
            row.departed.to_string(),
            row.arrived.to_string(),
            row.completed.to_string(),
            row.total_accumulation.to_string(),
            row.skipped_nodes.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.flow_cells.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
