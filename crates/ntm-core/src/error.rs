//! Base error type.
//!
//! Sub-crates define their own error enums and either convert into `NtmError`
//! via `From` impls or keep them separate and wrap `NtmError` as one variant.
//! Both patterns are acceptable; prefer whichever keeps error sites clean.
//!
//! Recoverable conditions (skipped nodes, non-adjacent degenerate geometry,
//! unreachable destinations) are NOT errors — they are explicit outcome
//! variants in the crates that produce them.  `NtmError` is for conditions
//! that abort the current operation.

use thiserror::Error;

use crate::{AreaId, NodeId};

/// The top-level error type for `ntm-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum NtmError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("area {0} not found")]
    AreaNotFound(AreaId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `ntm-*` crates.
pub type NtmResult<T> = Result<T, NtmError>;
