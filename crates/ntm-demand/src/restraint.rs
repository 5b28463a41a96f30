//! Border capacity restraints between neighbouring zones.
//!
//! A restraint caps the rate at which one zone releases vehicles towards a
//! specific neighbour, overriding the default drawn from the connecting
//! edge's capacity.  Keyed by external zone codes like everything else in
//! this crate; resolution to graph vertices happens in the orchestrator.

/// One directed border restraint, after applying the optional row factor.
#[derive(Clone, Debug)]
pub struct CapacityRestraint {
    pub from: String,
    pub to: String,
    /// Effective cap, veh/h.
    pub capacity_per_hour: f64,
}
