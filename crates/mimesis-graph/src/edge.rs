//! Node identifiers and canonical edge keys.

use std::borrow::Borrow;
use std::fmt;

/// An opaque node identifier, unique within a graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(String);

impl NodeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&NodeId> for NodeId {
    fn from(node: &NodeId) -> Self {
        node.clone()
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical identity of an undirected edge.
///
/// The endpoints are stored in lexicographic order, so `EdgeKey::new(u, v)`
/// and `EdgeKey::new(v, u)` are equal and hash identically. Ordering of keys
/// is lexicographic on `(low, high)`, which is the order edges are listed in
/// the exchange format. Serialized as the two-element array `[low, high]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "(NodeId, NodeId)", from = "(NodeId, NodeId)"))]
pub struct EdgeKey {
    low: NodeId,
    high: NodeId,
}

impl EdgeKey {
    /// Build the canonical key for the pair `{u, v}`.
    ///
    /// Does not reject `u == v`; the graph does that when an edge is stored.
    pub fn new(u: impl Into<NodeId>, v: impl Into<NodeId>) -> Self {
        let (u, v) = (u.into(), v.into());
        if u <= v {
            Self { low: u, high: v }
        } else {
            Self { low: v, high: u }
        }
    }

    /// The lexicographically smaller endpoint.
    pub fn low(&self) -> &NodeId {
        &self.low
    }

    /// The lexicographically larger endpoint.
    pub fn high(&self) -> &NodeId {
        &self.high
    }

    pub fn endpoints(&self) -> (&NodeId, &NodeId) {
        (&self.low, &self.high)
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        &self.low == node || &self.high == node
    }

    /// The endpoint opposite `node`, or `None` if `node` is not on this edge.
    pub fn other(&self, node: &NodeId) -> Option<&NodeId> {
        if &self.low == node {
            Some(&self.high)
        } else if &self.high == node {
            Some(&self.low)
        } else {
            None
        }
    }

    pub fn is_loop(&self) -> bool {
        self.low == self.high
    }
}

impl From<(NodeId, NodeId)> for EdgeKey {
    fn from((u, v): (NodeId, NodeId)) -> Self {
        Self::new(u, v)
    }
}

impl From<EdgeKey> for (NodeId, NodeId) {
    fn from(key: EdgeKey) -> Self {
        (key.low, key.high)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<->{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent() {
        let a = EdgeKey::new("Betty", "Alice");
        let b = EdgeKey::new("Alice", "Betty");
        assert_eq!(a, b);
        assert_eq!(a.low().as_str(), "Alice");
        assert_eq!(a.high().as_str(), "Betty");
    }

    #[test]
    fn other_endpoint() {
        let key = EdgeKey::new("a", "b");
        assert_eq!(key.other(&"a".into()), Some(&NodeId::from("b")));
        assert_eq!(key.other(&"b".into()), Some(&NodeId::from("a")));
        assert_eq!(key.other(&"c".into()), None);
    }

    #[test]
    fn keys_sort_by_low_then_high() {
        let mut keys = vec![
            EdgeKey::new("b", "c"),
            EdgeKey::new("c", "a"),
            EdgeKey::new("b", "a"),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["a<->b", "a<->c", "b<->c"]);
    }

    #[test]
    fn pair_conversion_canonicalizes() {
        let key = EdgeKey::from((NodeId::from("z"), NodeId::from("a")));
        let (low, high): (NodeId, NodeId) = key.into();
        assert_eq!(low.as_str(), "a");
        assert_eq!(high.as_str(), "z");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn key_serializes_as_pair() {
        let key = EdgeKey::new("b", "a");
        assert_eq!(serde_json::to_string(&key).unwrap(), r#"["a","b"]"#);
        let parsed: EdgeKey = serde_json::from_str(r#"["b","a"]"#).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn loop_detection() {
        assert!(EdgeKey::new("x", "x").is_loop());
        assert!(!EdgeKey::new("x", "y").is_loop());
    }
}
