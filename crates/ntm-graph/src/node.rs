//! Graph vertex type.

use ntm_core::{AreaId, NodeId, Point2};

use crate::link::TrafficBehaviourType;

/// A graph vertex: identity, location, optional zone, behaviour tag.
///
/// Identity towards the outside world is the external string `code`; the
/// numeric `id` is the arena index within one graph.  The link graph and
/// the area graph hold *distinct* `BoundedNode` instances (with distinct
/// numeric ids) that may reference the same zone.
///
/// `area` is `None` for pure flow joints that lie outside every zone —
/// callers must branch on presence rather than assume one.
#[derive(Clone, Debug)]
pub struct BoundedNode {
    pub id: NodeId,
    pub code: String,
    pub point: Point2,
    pub area: Option<AreaId>,
    pub behaviour: TrafficBehaviourType,
}
