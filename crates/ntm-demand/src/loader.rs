//! CSV demand loaders.
//!
//! # Trip matrix format
//!
//! One row per OD cell; duplicate cells are summed.
//!
//! ```csv
//! origin,destination,trips
//! Z01,Z02,430.0
//! Z01,Z03,120.5
//! cordon_north,Z02,900.0
//! ```
//!
//! # Departure profile format
//!
//! One row per segment, ascending, non-overlapping.  `share` is the fraction
//! of total demand departing in that segment.
//!
//! ```csv
//! start_secs,duration_secs,share
//! 0,3600,0.25
//! 3600,3600,0.50
//! 7200,3600,0.25
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::{DemandError, DemandResult};
use crate::matrix::{TripDemand, TripDemandRecord};
use crate::profile::{DepartureTimeProfile, ProfileSegment};
use crate::restraint::CapacityRestraint;

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TripRow {
    origin:      String,
    destination: String,
    trips:       f64,
}

#[derive(Deserialize)]
struct ProfileRow {
    start_secs:    u64,
    duration_secs: u64,
    share:         f64,
}

#[derive(Deserialize)]
struct RestraintRow {
    from:              String,
    to:                String,
    capacity_per_hour: f64,
    /// Optional multiplicative factor; defaults to 1.0.
    factor:            Option<f64>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the OD trip matrix from a CSV file.
pub fn load_trips_csv(path: &Path) -> DemandResult<TripDemand> {
    let file = std::fs::File::open(path).map_err(DemandError::Io)?;
    load_trips_reader(file)
}

/// Like [`load_trips_csv`] but accepts any `Read` source (pass a
/// `std::io::Cursor` in tests).
pub fn load_trips_reader<R: Read>(reader: R) -> DemandResult<TripDemand> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for result in csv_reader.deserialize::<TripRow>() {
        let row = result.map_err(|e| DemandError::Parse(e.to_string()))?;
        if !row.trips.is_finite() || row.trips < 0.0 {
            return Err(DemandError::Parse(format!(
                "OD {}->{} has invalid trip count {}",
                row.origin, row.destination, row.trips
            )));
        }
        records.push(TripDemandRecord {
            origin: row.origin,
            destination: row.destination,
            trips: row.trips,
        });
    }
    Ok(TripDemand::new(records))
}

/// Load a departure-time profile from a CSV file.
pub fn load_profile_csv(path: &Path) -> DemandResult<DepartureTimeProfile> {
    let file = std::fs::File::open(path).map_err(DemandError::Io)?;
    load_profile_reader(file)
}

/// Like [`load_profile_csv`] but accepts any `Read` source.
pub fn load_profile_reader<R: Read>(reader: R) -> DemandResult<DepartureTimeProfile> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut segments = Vec::new();
    for result in csv_reader.deserialize::<ProfileRow>() {
        let row = result.map_err(|e| DemandError::Parse(e.to_string()))?;
        segments.push(ProfileSegment {
            start_secs: row.start_secs,
            duration_secs: row.duration_secs,
            share: row.share,
        });
    }
    DepartureTimeProfile::new(segments)
}

/// Load directed border capacity restraints from a CSV file.
///
/// ```csv
/// from,to,capacity_per_hour,factor
/// Z01,Z02,1200.0,
/// Z02,Z01,1200.0,0.5
/// ```
pub fn load_restraints_csv(path: &Path) -> DemandResult<Vec<CapacityRestraint>> {
    let file = std::fs::File::open(path).map_err(DemandError::Io)?;
    load_restraints_reader(file)
}

/// Like [`load_restraints_csv`] but accepts any `Read` source.
pub fn load_restraints_reader<R: Read>(reader: R) -> DemandResult<Vec<CapacityRestraint>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut restraints = Vec::new();
    for result in csv_reader.deserialize::<RestraintRow>() {
        let row = result.map_err(|e| DemandError::Parse(e.to_string()))?;
        let capacity = row.capacity_per_hour * row.factor.unwrap_or(1.0);
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(DemandError::Parse(format!(
                "restraint {}->{} has invalid capacity {capacity}",
                row.from, row.to
            )));
        }
        restraints.push(CapacityRestraint {
            from: row.from,
            to: row.to,
            capacity_per_hour: capacity,
        });
    }
    Ok(restraints)
}
