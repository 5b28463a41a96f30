//! Departure-time profiles.
//!
//! A profile slices the simulated period into contiguous segments, each
//! holding a share of the total OD demand.  Per tick, the orchestrator asks
//! for the fraction of total demand departing during that tick: the segment's
//! share scaled by the tick's coverage of the segment.

use log::warn;

use ntm_core::SimClock;

use crate::error::{DemandError, DemandResult};

/// One profile segment: `share` of total demand departs uniformly over
/// `[start_secs, start_secs + duration_secs)`, relative to run start.
#[derive(Clone, Debug)]
pub struct ProfileSegment {
    pub start_secs: u64,
    pub duration_secs: u64,
    pub share: f64,
}

/// A full departure-time profile.
#[derive(Clone, Debug)]
pub struct DepartureTimeProfile {
    segments: Vec<ProfileSegment>,
}

impl DepartureTimeProfile {
    /// Validate and build.  Segments must be non-empty, non-overlapping,
    /// in ascending order, with non-negative shares.  Shares that do not sum
    /// to 1.0 are accepted with a warning (some demand simply never departs,
    /// or departs outside the simulated period).
    pub fn new(segments: Vec<ProfileSegment>) -> DemandResult<Self> {
        if segments.is_empty() {
            return Err(DemandError::Profile("no segments".into()));
        }
        let mut end = 0u64;
        let mut total = 0.0;
        for (i, seg) in segments.iter().enumerate() {
            if seg.duration_secs == 0 {
                return Err(DemandError::Profile(format!("segment {i} has zero duration")));
            }
            if seg.start_secs < end {
                return Err(DemandError::Profile(format!("segment {i} overlaps its predecessor")));
            }
            if seg.share < 0.0 || !seg.share.is_finite() {
                return Err(DemandError::Profile(format!("segment {i} has share {}", seg.share)));
            }
            end = seg.start_secs + seg.duration_secs;
            total += seg.share;
        }
        if (total - 1.0).abs() > 1e-6 {
            warn!("departure profile shares sum to {total:.6}, not 1.0");
        }
        Ok(Self { segments })
    }

    /// Uniform profile: all demand spread evenly over `duration_secs`.
    pub fn uniform(duration_secs: u64) -> Self {
        Self {
            segments: vec![ProfileSegment { start_secs: 0, duration_secs, share: 1.0 }],
        }
    }

    /// Fraction of *total* OD demand departing during the clock's current
    /// tick.  Zero outside every segment.  A tick is attributed wholly to
    /// the segment containing its start instant.
    pub fn fraction_for_tick(&self, clock: &SimClock) -> f64 {
        let tick_start = clock.current_tick.0 * clock.tick_duration_secs as u64;
        for seg in &self.segments {
            if tick_start >= seg.start_secs && tick_start < seg.start_secs + seg.duration_secs {
                return seg.share * clock.tick_duration_secs as f64 / seg.duration_secs as f64;
            }
        }
        0.0
    }

    pub fn segments(&self) -> &[ProfileSegment] {
        &self.segments
    }
}
