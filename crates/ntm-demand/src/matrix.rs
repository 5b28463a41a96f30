//! The OD trip-demand matrix.
//!
//! Origins and destinations are the external zone/feeder codes from the
//! input geography; resolving them to graph vertices is the orchestrator's
//! job (an unresolvable code is its problem to log and skip, not ours).

use rustc_hash::FxHashMap;

use ntm_core::SimClock;

use crate::profile::DepartureTimeProfile;

/// One OD cell: total trips over the whole simulated period.
#[derive(Clone, Debug)]
pub struct TripDemandRecord {
    pub origin: String,
    pub destination: String,
    /// Total vehicle trips for this OD pair, spread over the run by the
    /// departure-time profile.
    pub trips: f64,
}

/// All OD demand for one run.  Built once by the loader, read-only after.
#[derive(Default)]
pub struct TripDemand {
    records: Vec<TripDemandRecord>,
    by_od: FxHashMap<(String, String), usize>,
}

impl TripDemand {
    /// Build from records, summing duplicated OD cells.
    pub fn new(records: Vec<TripDemandRecord>) -> Self {
        let mut demand = TripDemand::default();
        for record in records {
            demand.add(record);
        }
        demand
    }

    fn add(&mut self, record: TripDemandRecord) {
        let key = (record.origin.clone(), record.destination.clone());
        match self.by_od.get(&key) {
            Some(&idx) => self.records[idx].trips += record.trips,
            None => {
                self.by_od.insert(key, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// OD cells in input order (duplicates merged into the first occurrence).
    pub fn records(&self) -> &[TripDemandRecord] {
        &self.records
    }

    pub fn trips(&self, origin: &str, destination: &str) -> f64 {
        self.by_od
            .get(&(origin.to_owned(), destination.to_owned()))
            .map(|&idx| self.records[idx].trips)
            .unwrap_or(0.0)
    }

    /// Vehicles departing from `origin` towards `destination` during the
    /// clock's current tick: the OD total scaled by the profile's per-tick
    /// departure fraction.
    pub fn demand_for_tick(
        &self,
        origin: &str,
        destination: &str,
        profile: &DepartureTimeProfile,
        clock: &SimClock,
    ) -> f64 {
        self.trips(origin, destination) * profile.fraction_for_tick(clock)
    }

    pub fn total_trips(&self) -> f64 {
        self.records.iter().map(|r| r.trips).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
