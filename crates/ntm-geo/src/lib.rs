//! `ntm-geo` — traffic zones and spatial-adjacency reasoning.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`area`]      | `Area` zone, road-length accumulation                     |
//! | [`adjacency`] | pairwise touching detection, `PairCheck` outcomes         |
//! | [`index`]     | `AreaIndex` — R-tree over zone envelopes                  |
//!
//! Zones are polygonal aggregation units: each generates and absorbs traffic
//! and holds a symmetric set of touching neighbours.  Adjacency is detected
//! once after loading and mutated again only by isolated-area repair (in the
//! graph crate); afterwards it is read-only.

pub mod adjacency;
pub mod area;
pub mod index;


pub use adjacency::{find_touching, AdjacencyReport, PairCheck};
pub use area::{accumulate_road_lengths, find_area, Area, RoadSegment};
pub use index::AreaIndex;
