//! Immutable per-zone fundamental-diagram calibration.

use thiserror::Error;

/// Errors produced while constructing flow parameters.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("critical accumulations must be strictly increasing, got {0:?}")]
    NonIncreasingThresholds([f64; 3]),

    #[error("non-positive {what}: {value}")]
    NonPositive { what: &'static str, value: f64 },
}

pub type FlowResult<T> = Result<T, FlowError>;

/// Per-zone fundamental-diagram parameters.  Set once, read-only.
///
/// Accumulation thresholds are in vehicles: `acc_critical = [acc₁, acc₂,
/// acc_jam]` with `acc₁ < acc₂ < acc_jam`.  Production rises linearly from
/// (0, 0) to (acc₁, max_capacity), stays flat to acc₂, and falls to
/// (acc_jam, 0).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FdParameters {
    /// `[acc₁, acc₂, acc_jam]`, vehicles.
    pub acc_critical: [f64; 3],
    /// Free speed, km/h.
    pub free_speed_kmh: f64,
    /// Aggregate lane length, km.
    pub road_length_km: f64,
    /// Peak production, veh/h.
    pub max_capacity_per_hour: f64,
}

/// Default per-km critical accumulations (veh per lane-km) used when a zone
/// has no calibration row: at capacity from 25 veh/km, jam at 100 veh/km.
const DEFAULT_ACC_PER_KM: [f64; 3] = [25.0, 50.0, 100.0];

impl FdParameters {
    /// Build from explicit thresholds; capacity is derived as the production
    /// of the rising branch at acc₁ (`acc₁ · v / L`).
    pub fn new(acc_critical: [f64; 3], free_speed_kmh: f64, road_length_km: f64) -> FlowResult<Self> {
        let max_capacity = acc_critical[0] * free_speed_kmh / road_length_km;
        Self::with_capacity(acc_critical, free_speed_kmh, road_length_km, max_capacity)
    }

    /// Build from explicit thresholds and a calibrated peak capacity
    /// (capacity-restraint file row).
    pub fn with_capacity(
        acc_critical: [f64; 3],
        free_speed_kmh: f64,
        road_length_km: f64,
        max_capacity_per_hour: f64,
    ) -> FlowResult<Self> {
        if !(acc_critical[0] < acc_critical[1] && acc_critical[1] < acc_critical[2]) {
            return Err(FlowError::NonIncreasingThresholds(acc_critical));
        }
        if free_speed_kmh <= 0.0 {
            return Err(FlowError::NonPositive { what: "free speed", value: free_speed_kmh });
        }
        if road_length_km <= 0.0 {
            return Err(FlowError::NonPositive { what: "road length", value: road_length_km });
        }
        Ok(Self {
            acc_critical,
            free_speed_kmh,
            road_length_km,
            max_capacity_per_hour,
        })
    }

    /// Derive defaults for a zone without a calibration row: per-km default
    /// thresholds scaled by the zone's aggregate road length.
    ///
    /// Roadless zones carry infinite road length (see ntm-geo); their
    /// thresholds become infinite too, which makes `supply` permanently
    /// `max_capacity` and `demand` effectively zero — such zones are served
    /// by CORDON/FLOW behaviour and never run the NTM diagram in anger.
    pub fn from_area(avg_speed_kmh: f64, road_length_km: f64) -> Self {
        let acc_critical = [
            DEFAULT_ACC_PER_KM[0] * road_length_km,
            DEFAULT_ACC_PER_KM[1] * road_length_km,
            DEFAULT_ACC_PER_KM[2] * road_length_km,
        ];
        Self {
            acc_critical,
            free_speed_kmh: avg_speed_kmh,
            road_length_km,
            // acc₁ · v / L with acc₁ = 25·L: the L cancels, so this stays
            // finite even for infinite road length.
            max_capacity_per_hour: DEFAULT_ACC_PER_KM[0] * avg_speed_kmh,
        }
    }

    #[inline]
    pub fn acc_max_capacity_start(&self) -> f64 {
        self.acc_critical[0]
    }

    #[inline]
    pub fn acc_max_capacity_end(&self) -> f64 {
        self.acc_critical[1]
    }

    #[inline]
    pub fn acc_jam(&self) -> f64 {
        self.acc_critical[2]
    }
}
