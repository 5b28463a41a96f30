//! `ntm-routes` — stochastic route-choice fractions for the area graph.
//!
//! # Crate layout
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`floyd`]     | dense Floyd–Warshall with first-edge recovery         |
//! | [`fractions`] | perturbation sampling, `RouteFractions` share tables  |
//!
//! Sampling happens once, after graph construction and before the first
//! tick; the resulting [`RouteFractions`] is read-only for the rest of the
//! run.  All randomness flows through an explicit [`SimRng`](ntm_core::SimRng)
//! handle, so a fixed seed reproduces the exact same tables.

pub mod floyd;
pub mod fractions;


pub use floyd::AllPairs;
pub use fractions::{sample_route_fractions, RouteFractions, MIN_WEIGHT_FACTOR};
