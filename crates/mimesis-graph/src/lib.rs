//! Mimesis Signed Graph
//!
//! Mutable signed undirected graph for structural-balance simulation.
//!
//! # Model
//!
//! Nodes are opaque string identifiers. Every edge joins two distinct nodes
//! and carries a sign: `+1` (friend) or `-1` (enemy). An absent edge means
//! "no relationship" and reads back as the neutral value `0`, which is never
//! stored.
//!
//! Edges are stored under a canonical [`EdgeKey`] (the lexicographically
//! ordered pair), so `(u, v)` and `(v, u)` always resolve to the same entry.
//!
//! # Determinism
//!
//! All node and edge iteration is ordered (`BTreeMap`/`BTreeSet`), so anything
//! built on top of the graph sees the same order regardless of insertion
//! history. The [`GraphRecord`] exchange format relies on this for
//! reproducible output.
//!
//! # Speculative evaluation
//!
//! [`SignedGraph::speculate`] runs a closure against an isolated copy. Nothing
//! the closure does is visible on the original graph.

mod edge;
mod error;
mod exchange;
mod graph;
mod sign;

pub use edge::{EdgeKey, NodeId};
pub use error::{GraphError, Result};
pub use exchange::{EdgeRecord, GraphRecord};
pub use graph::{SignCounts, SignedGraph};
pub use sign::Sign;

/// Value reported for a pair of nodes with no stored edge.
pub const NO_EDGE: i8 = 0;
