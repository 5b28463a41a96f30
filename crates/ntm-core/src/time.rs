//! Simulation time model.
//!
//! # Design
//!
//! Time is represented as a monotonically increasing `Tick` counter.  The
//! mapping to wall-clock time is held in `SimClock`:
//!
//!   wall_time = start_unix_secs + tick * tick_duration_secs
//!
//! Using an integer tick as the canonical time unit means all demand-bucket
//! arithmetic is exact (no floating-point drift) and comparisons are O(1).
//!
//! The default tick duration is 10 s — the reference calibration for both
//! the area accounting and the nested cell-transmission propagation (a
//! free-flow vehicle crosses exactly one flow cell per tick, so the cell
//! decomposition is derived from this same Δt).

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
///
/// Stored as `u64`: at the default 10 s per tick a u64 outlasts any
/// conceivable scenario by dozens of orders of magnitude.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and Unix wall-clock seconds.
///
/// `SimClock` is cheap to copy and intentionally holds no heap data.  The
/// hosting scheduler owns the real clock — the core only registers a
/// recurring advance-one-tick callback; this type just tracks where the
/// simulated run currently is.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Unix timestamp (seconds since epoch) of tick 0.
    pub start_unix_secs: i64,
    /// How many real seconds one tick represents.  Default: 10.
    pub tick_duration_secs: u32,
    /// The current tick — advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    /// Create a clock starting at `start_unix_secs` with the given resolution.
    pub fn new(start_unix_secs: i64, tick_duration_secs: u32) -> Self {
        Self {
            start_unix_secs,
            tick_duration_secs,
            current_tick: Tick::ZERO,
        }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> i64 {
        self.current_tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Current Unix timestamp corresponding to `current_tick`.
    #[inline]
    pub fn current_unix_secs(&self) -> i64 {
        self.start_unix_secs + self.elapsed_secs()
    }

    /// The tick duration expressed in hours — flow rates in this model are
    /// vehicles per hour, so per-tick volumes are `rate * dt_hours()`.
    #[inline]
    pub fn dt_hours(&self) -> f64 {
        self.tick_duration_secs as f64 / 3_600.0
    }

    /// How many ticks span `secs` seconds? (rounds up)
    #[inline]
    pub fn ticks_for_secs(&self, secs: u64) -> u64 {
        secs.div_ceil(self.tick_duration_secs as u64)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+{}s)", self.current_tick, self.elapsed_secs())
    }
}

// ── NtmSettings ───────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically loaded from a TOML/JSON file by the application and passed to
/// the graph builder, route assignment, and the orchestrator.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NtmSettings {
    /// Unix timestamp for tick 0.
    pub start_unix_secs: i64,

    /// Seconds per tick (Δt).  Drives both the area accounting and the flow
    /// cell decomposition.  Default: 10.
    pub tick_duration_secs: u32,

    /// Total ticks to simulate.  The reference scenario runs 10 800 s at
    /// 10 s/tick: 1080 ticks.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical route
    /// tables and therefore identical runs.
    pub seed: u64,

    /// Number of randomized shortest-path samples (K) used for route-choice
    /// fractions.
    pub route_samples: u32,

    /// Variance of the Gaussian factor (mean 1.0) applied to edge weights
    /// per route sample.
    pub route_weight_variance: f64,

    /// Worker thread count passed to Rayon for the evaluate phase.
    /// `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Emit a snapshot every N ticks.  0 disables snapshots.
    pub snapshot_interval_ticks: u64,
}

impl NtmSettings {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.start_unix_secs, self.tick_duration_secs)
    }

    /// Δt in hours, for converting veh/h rates into per-tick vehicle counts.
    #[inline]
    pub fn dt_hours(&self) -> f64 {
        self.tick_duration_secs as f64 / 3_600.0
    }
}

impl Default for NtmSettings {
    fn default() -> Self {
        Self {
            start_unix_secs: 0,
            tick_duration_secs: 10,
            total_ticks: 1_080,
            seed: 0,
            route_samples: 10,
            route_weight_variance: 0.1,
            num_threads: None,
            snapshot_interval_ticks: 0,
        }
    }
}
