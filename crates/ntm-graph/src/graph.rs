//! Id-based directed graph arena.
//!
//! Nodes and edges live in `Vec` arenas and cross-reference each other by
//! typed id, never by owning pointer.  Adjacency is a per-node
//! edge-id list rather than CSR because isolated-area repair appends edges
//! after the initial build; iteration order is insertion order, which keeps
//! rebuilds deterministic for stable input order.

use rustc_hash::FxHashMap;

use ntm_core::{AreaId, EdgeId, NodeId, Point2};

use crate::error::{GraphError, GraphResult};
use crate::link::{LinkEdge, TrafficBehaviourType};
use crate::node::BoundedNode;

/// A directed weighted graph of [`BoundedNode`]s and [`LinkEdge`]s.
#[derive(Default)]
pub struct NtmGraph {
    nodes: Vec<BoundedNode>,
    edges: Vec<LinkEdge>,
    out: Vec<Vec<EdgeId>>,
    code_to_node: FxHashMap<String, NodeId>,
}

impl NtmGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    /// Add a node; the code must be unique within this graph.
    pub fn add_node(
        &mut self,
        code: impl Into<String>,
        point: Point2,
        area: Option<AreaId>,
        behaviour: TrafficBehaviourType,
    ) -> GraphResult<NodeId> {
        let code = code.into();
        if self.code_to_node.contains_key(&code) {
            return Err(GraphError::DuplicateNode(code));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.code_to_node.insert(code.clone(), id);
        self.nodes.push(BoundedNode { id, code, point, area, behaviour });
        self.out.push(Vec::new());
        Ok(id)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &BoundedNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut BoundedNode {
        &mut self.nodes[id.index()]
    }

    pub fn node_by_code(&self, code: &str) -> Option<NodeId> {
        self.code_to_node.get(code).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &BoundedNode> {
        self.nodes.iter()
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Add a directed edge.  `edge.from`/`edge.to` must already exist.
    pub fn add_edge(&mut self, edge: LinkEdge) -> GraphResult<EdgeId> {
        if edge.from.index() >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(edge.from));
        }
        if edge.to.index() >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(edge.to));
        }
        let id = EdgeId(self.edges.len() as u32);
        self.out[edge.from.index()].push(id);
        self.edges.push(edge);
        Ok(id)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &LinkEdge {
        &self.edges[id.index()]
    }

    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut LinkEdge {
        &mut self.edges[id.index()]
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &LinkEdge> {
        self.edges.iter()
    }

    /// Outgoing edge ids of `node`, in insertion order.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.out[node.index()]
    }

    /// Out-degree of `node`.
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out[node.index()].len()
    }

    /// The first edge from `a` to `b`, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.out[a.index()]
            .iter()
            .copied()
            .find(|&e| self.edges[e.index()].to == b)
    }
}
