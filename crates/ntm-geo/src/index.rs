//! R-tree index over zone envelopes.
//!
//! Used by isolated-area repair to find candidate neighbours within an
//! expanding/shrinking search envelope.  Bulk-loaded once after the zones
//! are read; never mutated.

use rstar::{RTree, RTreeObject, AABB};

use ntm_core::AreaId;

use crate::area::Area;

/// Entry stored in the R-tree: a zone's axis-aligned envelope plus its id.
#[derive(Clone)]
struct AreaEnvelope {
    lower: [f64; 2],
    upper: [f64; 2],
    id: AreaId,
}

impl RTreeObject for AreaEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.lower, self.upper)
    }
}

/// Spatial index over zone envelopes.
pub struct AreaIndex {
    tree: RTree<AreaEnvelope>,
}

impl AreaIndex {
    /// Bulk-load the index.  Zones with degenerate geometry (no envelope)
    /// are left out — they can never be found as repair candidates.
    pub fn build(areas: &[Area]) -> Self {
        let entries: Vec<AreaEnvelope> = areas
            .iter()
            .filter_map(|a| {
                a.envelope().map(|(min, max)| AreaEnvelope {
                    lower: [min.x, min.y],
                    upper: [max.x, max.y],
                    id: a.id,
                })
            })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    /// All zones whose envelope intersects `area`'s envelope expanded by
    /// `radius` map units on every side.  `area` itself is excluded.
    ///
    /// Envelope intersection over-approximates true distance — a returned
    /// candidate may be farther than `radius` from the zone boundary; the
    /// caller resolves actual connectivity via shortest paths.
    pub fn query_expanded(&self, area: &Area, radius: f64) -> Vec<AreaId> {
        let Some((min, max)) = area.envelope() else {
            return Vec::new();
        };
        let search = AABB::from_corners(
            [min.x - radius, min.y - radius],
            [max.x + radius, max.y + radius],
        );
        self.tree
            .locate_in_envelope_intersecting(&search)
            .map(|e| e.id)
            .filter(|&id| id != area.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
