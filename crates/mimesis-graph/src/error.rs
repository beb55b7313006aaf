//! Error types for mimesis-graph.

use thiserror::Error;

use crate::edge::NodeId;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while building or mutating a signed graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge sign other than +1 or -1 was supplied.
    #[error("edge sign must be +1 or -1, got {0}")]
    InvalidSign(i64),

    /// A flip was requested on a pair with no stored edge.
    #[error("edge {u}<->{v} does not exist")]
    MissingEdge { u: NodeId, v: NodeId },

    /// Both endpoints of an edge are the same node.
    #[error("edge endpoints must be distinct, got {0} twice")]
    SelfLoop(NodeId),
}
