//! `ntm-flow` — fundamental-diagram evaluators and per-node flow state.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`params`]    | `FdParameters` — immutable per-zone calibration          |
//! | [`diagram`]   | pure `production` / `demand` / `supply` evaluators       |
//! | [`behaviour`] | `CellBehaviour` (NTM/FLOW/CORDON/ROAD), `FlowState`      |
//!
//! The fundamental diagram is a piecewise-linear curve over accumulation
//! `n` (vehicles currently inside a zone or cell):
//!
//! ```text
//! production
//!     ▲        ____________
//! cap │       /            \
//!     │      /              \
//!     │     /                \
//!     └────•──────•──────•────•───▶ n
//!          0    acc₁   acc₂  acc_jam
//! ```
//!
//! `demand(n)` is the rising branch clamped non-decreasing (how much the
//! zone wants to release); `supply(n)` is the flat/falling branch clamped
//! non-increasing (how much it can still accept).  Both are pure functions
//! of `(n, parameters)` and are recomputed at every call — caching them
//! across a tick would hide the accumulation update.

pub mod behaviour;
pub mod diagram;
pub mod params;

#[cfg(test)]
mod tests;

pub use behaviour::{BehaviourKind, CellBehaviour, DestinationLoad, FlowState, UNRESTRAINED_CAPACITY};
pub use diagram::{demand, production, supply};
pub use params::{FdParameters, FlowError, FlowResult};
