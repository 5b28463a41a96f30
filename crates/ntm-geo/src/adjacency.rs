//! Pairwise zone-adjacency detection.
//!
//! Every pair of zones is tested with a cheap envelope pre-filter before the
//! exact polygon predicate.  Degenerate geometry is detected up front and
//! surfaces as [`PairCheck::Skipped`] — the pair is treated as non-adjacent
//! and detection never fails as a whole.
//!
//! The relation is added to *both* zones explicitly.  The predicate itself is
//! symmetric on paper, but symmetry of the stored sets must not depend on
//! predicate execution order.

use geo::Intersects;
use log::warn;

use ntm_core::AreaId;

use crate::area::Area;

/// Outcome of testing one (unordered) pair of zones.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PairCheck {
    Adjacent,
    NotAdjacent,
    /// One of the two boundaries is degenerate; the pair is treated as
    /// non-adjacent.
    Skipped,
}

/// Summary of one detection run.
#[derive(Debug, Default, Clone)]
pub struct AdjacencyReport {
    /// Pairs that survived the envelope pre-filter and were tested exactly.
    pub pairs_tested: usize,
    /// Pairs found adjacent.
    pub adjacent_pairs: usize,
    /// Pairs skipped due to degenerate geometry.
    pub skipped_pairs: Vec<(AreaId, AreaId)>,
}

/// Test a single pair of zones.
pub fn check_pair(a: &Area, b: &Area) -> PairCheck {
    if !a.has_valid_geometry() || !b.has_valid_geometry() {
        return PairCheck::Skipped;
    }
    // Envelope pre-filter: disjoint envelopes cannot touch.
    match (a.envelope(), b.envelope()) {
        (Some((amin, amax)), Some((bmin, bmax))) => {
            if amax.x < bmin.x || bmax.x < amin.x || amax.y < bmin.y || bmax.y < amin.y {
                return PairCheck::NotAdjacent;
            }
        }
        _ => return PairCheck::Skipped,
    }
    // Exact predicate.  `intersects` subsumes `touches`: shared boundary
    // points intersect, so one call covers both relations.
    if a.polygon.intersects(&b.polygon) {
        PairCheck::Adjacent
    } else {
        PairCheck::NotAdjacent
    }
}

/// Detect all touching pairs and record the relation symmetrically.
///
/// O(n²) pairs with the envelope filter rejecting the vast majority before
/// any exact geometry work.  Never fails: degenerate pairs are logged,
/// reported, and treated as non-adjacent.
pub fn find_touching(areas: &mut [Area]) -> AdjacencyReport {
    let mut report = AdjacencyReport::default();

    for i in 0..areas.len() {
        for j in (i + 1)..areas.len() {
            match check_pair(&areas[i], &areas[j]) {
                PairCheck::Adjacent => {
                    report.pairs_tested += 1;
                    report.adjacent_pairs += 1;
                    let (id_i, id_j) = (areas[i].id, areas[j].id);
                    // Both sides, unconditionally.
                    areas[i].touching.insert(id_j);
                    areas[j].touching.insert(id_i);
                }
                PairCheck::NotAdjacent => report.pairs_tested += 1,
                PairCheck::Skipped => {
                    warn!(
                        "adjacency check skipped for degenerate pair ({}, {})",
                        areas[i].code, areas[j].code
                    );
                    report.skipped_pairs.push((areas[i].id, areas[j].id));
                }
            }
        }
    }

    report
}
