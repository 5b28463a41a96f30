//! Planar coordinate type.
//!
//! The NTM operates on projected geography (the reference data set uses the
//! Dutch RD-new plane, where one unit is one metre), so coordinates are plain
//! `f64` x/y and distances are Euclidean.  No geodesic math anywhere.

/// A point in the projected plane of the input geography.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in map units (metres for RD-new input).
    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// `true` when both coordinates are finite — degenerate input geometry
    /// commonly carries NaN vertices, which must never reach predicates.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
