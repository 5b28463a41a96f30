//! `ntm-sim` — the discrete-time flow-balancing orchestrator.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`model`]    | `NtmSim`: five-phase tick loop over the area graph      |
//! | [`outcome`]  | `NodeTickOutcome`, `SkipReason`, `TickSummary`          |
//! | [`observer`] | `SimObserver` callbacks, `NoopObserver`                 |
//! | [`snapshot`] | read-only per-vertex / per-flow-edge snapshots          |
//!
//! The orchestrator exclusively owns all dynamic flow state during a tick.
//! Phases run strictly in order; with the `parallel` Cargo feature the
//! evaluate phase fans out over Rayon (per-vertex evaluations are
//! independent), while distribution, correction, and commit stay sequential
//! and deterministic.

pub mod model;
pub mod observer;
pub mod outcome;
pub mod snapshot;


pub use model::NtmSim;
pub use observer::{NoopObserver, SimObserver};
pub use outcome::{NodeTickOutcome, SkipReason, TickSummary};
pub use snapshot::{FlowEdgeSnapshot, NodeSnapshot};
