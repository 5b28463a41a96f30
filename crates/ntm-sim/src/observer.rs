//! Simulation observer trait for progress reporting and data collection.

use ntm_core::Tick;

use crate::outcome::{SkipReason, TickSummary};
use crate::snapshot::{FlowEdgeSnapshot, NodeSnapshot};

/// Callbacks invoked by [`NtmSim::run`][crate::NtmSim::run] at key points in
/// the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — congestion logger
///
/// ```rust,ignore
/// struct SpillbackLogger;
///
/// impl SimObserver for SpillbackLogger {
///     fn on_node_skipped(&mut self, tick: Tick, node: NodeId, reason: SkipReason) {
///         eprintln!("{tick}: node {node} skipped ({reason})");
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any phase runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the commit phase with the tick's aggregate counters.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called whenever a node's update is skipped (also listed in the
    /// summary; this hook exists for immediate logging).
    fn on_node_skipped(&mut self, _tick: Tick, _node: ntm_core::NodeId, _reason: SkipReason) {}

    /// Called at snapshot intervals with read-only per-node and per-flow-edge
    /// state, so output writers can record without the sim knowing about any
    /// specific format.
    fn on_snapshot(&mut self, _nodes: &[NodeSnapshot], _flow_edges: &[FlowEdgeSnapshot]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
