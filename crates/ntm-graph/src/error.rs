//! Graph-subsystem error type.

use thiserror::Error;

use ntm_core::NodeId;

/// Errors produced by `ntm-graph`.
///
/// Recoverable construction hiccups (missing centroid, unreachable repair
/// candidate) are *not* here — they are logged and skipped.  These variants
/// abort the requested operation.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("duplicate node code {0:?}")]
    DuplicateNode(String),

    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },
}

pub type GraphResult<T> = Result<T, GraphError>;
