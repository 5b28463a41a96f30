//! Pure piecewise-linear fundamental-diagram evaluators.
//!
//! All three functions take `(n, parameters)` and nothing else.  They are
//! deliberately free functions with no memoization: accumulation changes
//! every tick and a stale cached value would silently break conservation.
//!
//! Domain handling: `n < 0` is clamped to 0 with a logged warning (negative
//! accumulation means an upstream accounting bug, but evaluation degrades
//! gracefully rather than halting the run); `n ≥ acc_jam` evaluates to 0
//! production.  Breakpoint inputs hit the knot values exactly.

use log::warn;

use crate::params::FdParameters;

/// Production (outflow rate, veh/h) at accumulation `n`.
///
/// The full tent curve: `min(demand, supply)` at every point.
pub fn production(n: f64, p: &FdParameters) -> f64 {
    demand(n, p).min(supply(n, p))
}

/// Demand (veh/h the zone wants to release) at accumulation `n`.
///
/// The rising branch only, clamped non-decreasing: linear from (0, 0) to
/// (acc₁, capacity), then flat at capacity for every larger accumulation.
pub fn demand(n: f64, p: &FdParameters) -> f64 {
    let n = clamp_accumulation(n);
    let acc1 = p.acc_max_capacity_start();
    if n >= acc1 {
        p.max_capacity_per_hour
    } else {
        n / acc1 * p.max_capacity_per_hour
    }
}

/// Supply (veh/h the zone can still accept) at accumulation `n`.
///
/// The flat/falling branch, clamped non-increasing: capacity up to acc₂,
/// linear down to (acc_jam, 0), zero beyond.
pub fn supply(n: f64, p: &FdParameters) -> f64 {
    let n = clamp_accumulation(n);
    let acc2 = p.acc_max_capacity_end();
    let jam = p.acc_jam();
    if n <= acc2 {
        p.max_capacity_per_hour
    } else if n >= jam {
        0.0
    } else {
        (jam - n) / (jam - acc2) * p.max_capacity_per_hour
    }
}

#[inline]
fn clamp_accumulation(n: f64) -> f64 {
    if n < 0.0 {
        warn!("negative accumulation {n} clamped to 0");
        0.0
    } else {
        n
    }
}
