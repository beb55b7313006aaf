//! The mutable signed graph.

use std::collections::{BTreeMap, BTreeSet};

use crate::edge::{EdgeKey, NodeId};
use crate::error::{GraphError, Result};
use crate::sign::Sign;
use crate::NO_EDGE;

/// Signed undirected graph.
///
/// Invariants:
/// - at most one sign per unordered pair (enforced by [`EdgeKey`])
/// - both endpoints of every stored edge are registered nodes
/// - the adjacency index mirrors the edge map exactly, sign included, so
///   lookups by a borrowed pair never build an [`EdgeKey`]
///
/// `Clone` produces a fully independent copy; there is no shared state
/// between a graph and its clones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(into = "crate::GraphRecord", try_from = "crate::GraphRecord")
)]
pub struct SignedGraph {
    nodes: BTreeSet<NodeId>,
    edges: BTreeMap<EdgeKey, Sign>,
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, Sign>>,
}

/// Count of positive and negative edges in a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignCounts {
    pub positive: usize,
    pub negative: usize,
}

impl SignedGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a complete graph over `nodes` with every edge set to `sign`.
    pub fn complete<I, N>(nodes: I, sign: Sign) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        let mut graph = Self::new();
        let nodes: Vec<NodeId> = nodes.into_iter().map(Into::into).collect();
        for node in &nodes {
            graph.add_node(node.clone());
        }
        for (i, u) in nodes.iter().enumerate() {
            for v in &nodes[i + 1..] {
                graph.set_edge(u.clone(), v.clone(), sign)?;
            }
        }
        Ok(graph)
    }

    /// Register a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, node: impl Into<NodeId>) {
        let node = node.into();
        self.adjacency.entry(node.clone()).or_default();
        self.nodes.insert(node);
    }

    /// Add or overwrite an edge from a raw numeric sign.
    ///
    /// Fails with [`GraphError::InvalidSign`] unless `sign` is +1 or -1.
    /// Both endpoints are registered as nodes.
    pub fn add_edge(&mut self, u: impl Into<NodeId>, v: impl Into<NodeId>, sign: i64) -> Result<()> {
        let sign = Sign::try_from(sign)?;
        self.set_edge(u, v, sign)
    }

    /// Add or overwrite an edge with an already validated sign.
    pub fn set_edge(&mut self, u: impl Into<NodeId>, v: impl Into<NodeId>, sign: Sign) -> Result<()> {
        let key = EdgeKey::new(u, v);
        if key.is_loop() {
            return Err(GraphError::SelfLoop(key.low().clone()));
        }

        let (low, high) = key.endpoints();
        self.add_node(low.clone());
        self.add_node(high.clone());
        if let Some(adj) = self.adjacency.get_mut(low) {
            adj.insert(high.clone(), sign);
        }
        if let Some(adj) = self.adjacency.get_mut(high) {
            adj.insert(low.clone(), sign);
        }

        self.edges.insert(key, sign);
        Ok(())
    }

    /// Flip the sign of an existing edge, returning the new sign.
    ///
    /// Fails with [`GraphError::MissingEdge`] if there is no edge between
    /// `u` and `v`.
    pub fn flip_edge(&mut self, u: impl Into<NodeId>, v: impl Into<NodeId>) -> Result<Sign> {
        let key = EdgeKey::new(u, v);
        self.flip(&key)
    }

    /// Flip the sign of the edge stored under `key`, returning the new sign.
    pub fn flip(&mut self, key: &EdgeKey) -> Result<Sign> {
        let Some(sign) = self.edges.get_mut(key) else {
            return Err(GraphError::MissingEdge {
                u: key.low().clone(),
                v: key.high().clone(),
            });
        };
        *sign = sign.flipped();
        let flipped = *sign;

        let (low, high) = key.endpoints();
        for (from, to) in [(low, high), (high, low)] {
            if let Some(entry) = self.adjacency.get_mut(from).and_then(|adj| adj.get_mut(to)) {
                *entry = flipped;
            }
        }
        Ok(flipped)
    }

    /// Sign of the edge between `u` and `v`, if one exists.
    pub fn edge(&self, u: &NodeId, v: &NodeId) -> Option<Sign> {
        self.adjacency.get(u)?.get(v).copied()
    }

    /// Sign stored under `key`, if any.
    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<Sign> {
        self.edges.get(key).copied()
    }

    /// Numeric sign of the edge between `u` and `v`: +1, -1, or [`NO_EDGE`].
    pub fn sign(&self, u: &NodeId, v: &NodeId) -> i8 {
        self.edge(u, v).map_or(NO_EDGE, Sign::value)
    }

    pub fn has_edge(&self, u: &NodeId, v: &NodeId) -> bool {
        self.edge(u, v).is_some()
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    /// All nodes sharing an edge (of either sign) with `node`, in sorted order.
    pub fn neighbors<'a>(&'a self, node: &NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.adjacency.get(node).into_iter().flat_map(BTreeMap::keys)
    }

    /// Neighbors joined to `node` by an edge of the given sign, in sorted order.
    pub fn neighbors_with_sign<'a>(
        &'a self,
        node: &'a NodeId,
        sign: Sign,
    ) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.adjacency
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(move |(other, s)| (*s == sign).then_some(other))
    }

    /// Number of neighbors of `node` (either sign).
    pub fn degree(&self, node: &NodeId) -> usize {
        self.adjacency.get(node).map_or(0, BTreeMap::len)
    }

    /// Positive and negative degree of `node`.
    pub fn signed_degree(&self, node: &NodeId) -> SignCounts {
        let mut counts = SignCounts::default();
        for sign in self.adjacency.get(node).into_iter().flat_map(BTreeMap::values) {
            match sign {
                Sign::Positive => counts.positive += 1,
                Sign::Negative => counts.negative += 1,
            }
        }
        counts
    }

    /// Nodes in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter()
    }

    /// Edges in canonical key order.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, Sign)> {
        self.edges.iter().map(|(key, sign)| (key, *sign))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of positive and negative edges in the whole graph.
    pub fn sign_counts(&self) -> SignCounts {
        let mut counts = SignCounts::default();
        for sign in self.edges.values() {
            match sign {
                Sign::Positive => counts.positive += 1,
                Sign::Negative => counts.negative += 1,
            }
        }
        counts
    }

    /// An independent structural copy.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Evaluate `f` against an isolated copy of this graph.
    ///
    /// Mutations performed by `f` are discarded with the copy.
    pub fn speculate<T>(&self, f: impl FnOnce(&mut SignedGraph) -> T) -> T {
        let mut scratch = self.snapshot();
        f(&mut scratch)
    }
}
