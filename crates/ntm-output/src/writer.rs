//! The `OutputWriter` trait implemented by all backend writers.

use crate::{FlowCellRow, OutputResult, TickSummaryRow, ZoneSnapshotRow};

/// Trait implemented by output backends.
///
/// All methods are infallible from the observer's perspective — errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`](crate::SimOutputObserver::take_error).
pub trait OutputWriter {
    /// Write a batch of per-vertex snapshots.
    fn write_snapshots(&mut self, rows: &[ZoneSnapshotRow]) -> OutputResult<()>;

    /// Write a batch of flow-cell occupancy rows.
    fn write_flow_cells(&mut self, rows: &[FlowCellRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
