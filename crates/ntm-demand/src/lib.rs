//! `ntm-demand` — OD trip demand and its time distribution.
//!
//! # Crate layout
//!
//! | Module        | Contents                                             |
//! |---------------|------------------------------------------------------|
//! | [`matrix`]    | `TripDemand`, `TripDemandRecord`                     |
//! | [`profile`]   | `DepartureTimeProfile`, per-tick departure fractions |
//! | [`restraint`] | `CapacityRestraint` border caps                      |
//! | [`loader`]    | CSV loaders for all of the above                     |
//! | [`error`]     | `DemandError`, `DemandResult<T>`                     |
//!
//! Demand stays keyed by external zone codes; the orchestrator resolves
//! codes to area-graph vertices when it injects trips.

pub mod error;
pub mod loader;
pub mod matrix;
pub mod profile;
pub mod restraint;


pub use error::{DemandError, DemandResult};
pub use loader::{
    load_profile_csv, load_profile_reader, load_restraints_csv, load_restraints_reader,
    load_trips_csv, load_trips_reader,
};
pub use matrix::{TripDemand, TripDemandRecord};
pub use profile::{DepartureTimeProfile, ProfileSegment};
pub use restraint::CapacityRestraint;
