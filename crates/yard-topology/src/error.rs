//! Topology error type.

use thiserror::Error;

use yard_core::{NodeId, SegmentId};

/// Errors produced by `yard-topology`.  All of them are fatal at load time.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("node {0} not found in map")]
    NodeNotFound(NodeId),

    #[error("unknown node type {0:?}")]
    UnknownNodeType(String),

    #[error("segment {segment} references missing node {node}")]
    DanglingSegment { segment: SegmentId, node: NodeId },

    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("duplicate segment id {0}")]
    DuplicateSegment(SegmentId),

    #[error("segment {0} has a negative or non-finite length")]
    InvalidLength(SegmentId),

    #[error("map parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TopologyResult<T> = Result<T, TopologyError>;
