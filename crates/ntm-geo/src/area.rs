//! The `Area` zone type and road-length aggregation.

use std::collections::BTreeSet;

use geo::{BoundingRect, Centroid, Contains, Intersects, Line, Polygon};
use log::debug;

use ntm_core::{AreaId, Point2};

/// An aggregated polygonal traffic zone.
///
/// Created once from the input geography.  The `touching` set is mutated
/// during adjacency detection and isolated-area repair, and is immutable
/// afterwards (`BTreeSet` so neighbour iteration order is deterministic).
#[derive(Clone, Debug)]
pub struct Area {
    /// Dense arena index.
    pub id: AreaId,
    /// External centroid code from the input geography; this is the zone's
    /// identity towards OD demand and parameter files.
    pub code: String,
    /// Human-readable name (for logs and output only).
    pub name: String,
    /// Zone boundary in projected map units.
    pub polygon: Polygon<f64>,
    /// Polygon centroid; the zone's vertex position in the area graph.
    pub centroid: Point2,
    /// Aggregate lane length of roads inside the zone, km.
    pub road_length_km: f64,
    /// Length-weighted average free speed of those roads, km/h.
    pub avg_speed_kmh: f64,
    /// Ids of zones whose boundary touches this one.  Symmetric.
    pub touching: BTreeSet<AreaId>,
}

impl Area {
    /// Build a zone from its boundary polygon.
    ///
    /// The centroid falls back to the mean of the exterior-ring vertices
    /// when the polygon is too degenerate for an exact centroid.
    pub fn new(id: AreaId, code: impl Into<String>, name: impl Into<String>, polygon: Polygon<f64>) -> Self {
        let centroid = polygon
            .centroid()
            .map(|p| Point2::new(p.x(), p.y()))
            .unwrap_or_else(|| exterior_mean(&polygon));
        Self {
            id,
            code: code.into(),
            name: name.into(),
            polygon,
            centroid,
            road_length_km: 0.0,
            avg_speed_kmh: 0.0,
            touching: BTreeSet::new(),
        }
    }

    /// `true` when the boundary is a usable ring: at least a closed triangle
    /// and every vertex finite.  Degenerate zones still exist as entities but
    /// are excluded from geometric predicates.
    pub fn has_valid_geometry(&self) -> bool {
        let ring = self.polygon.exterior();
        ring.0.len() >= 4 && ring.0.iter().all(|c| c.x.is_finite() && c.y.is_finite())
    }

    /// Axis-aligned envelope as `(min, max)` corners, or `None` for an empty
    /// or non-finite boundary.
    pub fn envelope(&self) -> Option<(Point2, Point2)> {
        if !self.has_valid_geometry() {
            return None;
        }
        self.polygon.bounding_rect().map(|r| {
            (
                Point2::new(r.min().x, r.min().y),
                Point2::new(r.max().x, r.max().y),
            )
        })
    }

    /// Does this zone contain the given point?
    pub fn contains_point(&self, p: Point2) -> bool {
        self.has_valid_geometry() && self.polygon.contains(&geo::Point::new(p.x, p.y))
    }
}

fn exterior_mean(polygon: &Polygon<f64>) -> Point2 {
    let ring = polygon.exterior();
    let n = ring.0.len().max(1) as f64;
    let (sx, sy) = ring.0.iter().fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Point2::new(sx / n, sy / n)
}

/// Find the zone containing `p`, scanning in arena order.
///
/// Returns the last matching zone when boundaries overlap; `None` when no
/// zone contains the point (a point on a pure flow joint, for instance).
pub fn find_area(areas: &[Area], p: Point2) -> Option<AreaId> {
    let mut found = None;
    for area in areas {
        if area.contains_point(p) {
            found = Some(area.id);
        }
    }
    found
}

// ── Road-length accumulation ──────────────────────────────────────────────────

/// A physical road segment used for zone road-length accounting.
#[derive(Clone, Debug)]
pub struct RoadSegment {
    /// Straight segment between the link's endpoints, map units.
    pub line: Line<f64>,
    /// Physical length, km.
    pub length_km: f64,
    /// Lane count (lane-kilometres are what the production function needs).
    pub lanes: f64,
    /// Free speed, km/h.
    pub free_speed_kmh: f64,
}

/// Accumulate lane length and length-weighted average free speed per zone.
///
/// A segment fully contained in a zone contributes its whole lane length; a
/// segment that merely crosses the boundary contributes half (it is shared
/// with the neighbouring zone).  Zones that end up with no covered road get
/// an infinite road length and a 100 km/h average so the fundamental diagram
/// degenerates to "never congested" rather than dividing by zero.
pub fn accumulate_road_lengths(areas: &mut [Area], segments: &[RoadSegment]) {
    let mut speed_len_sum = vec![0.0f64; areas.len()];

    for seg in segments {
        for area in areas.iter_mut() {
            if !area.has_valid_geometry() || !area.polygon.intersects(&seg.line) {
                continue;
            }
            let covers = if area.polygon.contains(&seg.line) { 1.0 } else { 0.5 };
            let lane_km = covers * seg.length_km * seg.lanes;
            area.road_length_km += lane_km;
            speed_len_sum[area.id.index()] += seg.free_speed_kmh * lane_km;
        }
    }

    for area in areas.iter_mut() {
        if area.road_length_km > 0.0 {
            area.avg_speed_kmh = speed_len_sum[area.id.index()] / area.road_length_km;
        } else {
            debug!("area {} has no covered road; treating as uncongestible", area.code);
            area.road_length_km = f64::INFINITY;
            area.avg_speed_kmh = 100.0;
        }
    }
}
