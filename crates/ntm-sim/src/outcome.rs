//! Per-node tick outcomes and the per-tick summary.
//!
//! Failure handling is visible in the type system: a node update either
//! succeeds or is skipped with a reason.  A skip never aborts the tick —
//! the loop records it and moves on to the next node.

use std::fmt;

use ntm_core::{NodeId, Tick};

/// Why a node's update was skipped this tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SkipReason {
    /// Accumulation or a derived rate came out non-finite.
    NonFiniteState,
    /// Accumulation went negative beyond rounding tolerance.
    NegativeAccumulation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NonFiniteState => "non-finite state",
            SkipReason::NegativeAccumulation => "negative accumulation",
        };
        f.write_str(s)
    }
}

/// Result of one node's update within a tick.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum NodeTickOutcome {
    Updated,
    Skipped(SkipReason),
}

/// Aggregate counters for one completed tick.
#[derive(Clone, Debug, Default)]
pub struct TickSummary {
    pub tick: Tick,
    /// Vehicles injected from OD demand this tick.
    pub injected: f64,
    /// Vehicles released by their holding node this tick.
    pub departed: f64,
    /// Vehicles accepted by a receiving node this tick (includes completions).
    pub arrived: f64,
    /// Trips that reached their destination this tick.
    pub completed: f64,
    /// Vehicles currently inside the network after the tick.
    pub total_accumulation: f64,
    /// Nodes whose update was skipped, with reasons.
    pub skipped: Vec<(NodeId, SkipReason)>,
}
