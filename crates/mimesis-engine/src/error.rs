//! Error types for mimesis-engine.

use mimesis_graph::{GraphError, NodeId};
use rand::distributions::WeightedError;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while configuring or running an engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A graph operation failed (invalid sign, missing edge, self-loop).
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// A node named by the caller is not in the graph.
    #[error("node {0} is not in the graph")]
    UnknownNode(NodeId),

    /// Rationality outside `[0, 1]`.
    #[error("rationality must lie in [0, 1], got {0}")]
    InvalidRationality(f64),

    /// Softmax weights could not form a distribution.
    #[error("cannot sample move: {0}")]
    Sampling(#[from] WeightedError),

    /// Malformed configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}
