//! Triangles and their balance classification.

use mimesis_graph::{NodeId, Sign, SignedGraph};

/// Classification of a triangle by how many of its edges are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TriangleKind {
    /// `+++`
    AllFriends,
    /// `++-`: two of a node's friends are enemies of each other
    SplitFriendship,
    /// `+--`: two friends share a common enemy
    CommonEnemy,
    /// `---`
    AllEnemies,
}

impl TriangleKind {
    pub const fn from_negative_count(negatives: usize) -> Self {
        match negatives {
            0 => TriangleKind::AllFriends,
            1 => TriangleKind::SplitFriendship,
            2 => TriangleKind::CommonEnemy,
            _ => TriangleKind::AllEnemies,
        }
    }

    pub const fn is_balanced(self) -> bool {
        matches!(self, TriangleKind::AllFriends | TriangleKind::CommonEnemy)
    }
}

/// Three mutually connected nodes and the signs between them.
///
/// Nodes are held in sorted order `(a, b, c)` and signs in the fixed order
/// `(a-b, b-c, a-c)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    nodes: [NodeId; 3],
    signs: [Sign; 3],
}

impl Triangle {
    /// Build a triangle from nodes already in sorted order and their signs
    /// in `(a-b, b-c, a-c)` order.
    pub(crate) fn new(nodes: [NodeId; 3], signs: [Sign; 3]) -> Self {
        debug_assert!(nodes[0] < nodes[1] && nodes[1] < nodes[2]);
        Self { nodes, signs }
    }

    /// Read the triangle over `{x, y, z}` from the graph, or `None` if any
    /// of the three edges is missing. Argument order does not matter.
    ///
    /// Nothing is cloned unless all three edges exist.
    pub fn from_graph(graph: &SignedGraph, x: &NodeId, y: &NodeId, z: &NodeId) -> Option<Self> {
        let mut nodes = [x, y, z];
        nodes.sort();
        let [a, b, c] = nodes;
        let ab = graph.edge(a, b)?;
        let bc = graph.edge(b, c)?;
        let ac = graph.edge(a, c)?;
        Some(Self::new([a.clone(), b.clone(), c.clone()], [ab, bc, ac]))
    }

    pub fn nodes(&self) -> &[NodeId; 3] {
        &self.nodes
    }

    pub fn signs(&self) -> &[Sign; 3] {
        &self.signs
    }

    pub fn negative_count(&self) -> usize {
        self.signs.iter().filter(|s| s.is_negative()).count()
    }

    pub fn is_balanced(&self) -> bool {
        self.negative_count() % 2 == 0
    }

    pub fn is_unbalanced(&self) -> bool {
        !self.is_balanced()
    }

    pub fn kind(&self) -> TriangleKind {
        TriangleKind::from_negative_count(self.negative_count())
    }

    /// Signs rendered in `(a-b, b-c, a-c)` order, e.g. `"++-"`.
    pub fn label(&self) -> String {
        self.signs.iter().map(|s| s.symbol()).collect()
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.nodes.contains(node)
    }

    /// The two members other than `node`, in sorted order.
    pub fn others(&self, node: &NodeId) -> Option<[&NodeId; 2]> {
        let [a, b, c] = &self.nodes;
        if a == node {
            Some([b, c])
        } else if b == node {
            Some([a, c])
        } else if c == node {
            Some([a, b])
        } else {
            None
        }
    }
}
