//! `ntm-graph` — the two-tier weighted graph over the input geography.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`link`]    | input records, `TrafficBehaviourType`, `LinkEdge`, cells   |
//! | [`node`]    | `BoundedNode`                                              |
//! | [`graph`]   | `NtmGraph` arena (nodes/edges by id, adjacency lists)      |
//! | [`path`]    | Dijkstra shortest path over an `NtmGraph`                  |
//! | [`builder`] | `GraphBuilder` — fine link graph + coarse area graph       |
//! | [`repair`]  | isolated-area reconnection                                 |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                             |
//!
//! # The two tiers
//!
//! The **link graph** has one vertex per unique physical endpoint id and one
//! edge per raw input link, weighted by physical length.  It exists for
//! shortest-path queries during construction and repair.
//!
//! The **area graph** is what the simulation runs on: one vertex per zone
//! centroid plus one per FLOW-link endpoint, with synthesized aggregate
//! edges between adjacent road-connected zones, FLOW edges retained with
//! their cell decomposition, and connector edges stitching FLOW endpoints
//! to the surrounding zones.  Edges are weighted by travel time in hours.
//!
//! Both graphs are id-based arenas with no object cycles; given
//! stable input iteration order, rebuilding from identical input produces
//! identical graphs.

pub mod builder;
pub mod error;
pub mod graph;
pub mod link;
pub mod node;
pub mod path;
pub mod repair;

#[cfg(test)]
mod tests;

pub use builder::{
    road_segments, BuiltGraphs, GraphBuilder, CONNECTOR_CAPACITY_PER_HOUR, CONNECTOR_SPEED_KMH,
    DETOUR_FACTOR,
};
pub use error::{GraphError, GraphResult};
pub use graph::NtmGraph;
pub use link::{promote_flow_links, FlowCell, LinkEdge, LinkRecord, NodeRecord, TrafficBehaviourType};
pub use node::BoundedNode;
pub use path::{shortest_path, Route};
pub use repair::{connect_isolated_areas, RepairReport};
