//! Neutral graph exchange format.
//!
//! A [`GraphRecord`] is the representation import/export collaborators work
//! with: a sorted node list and an edge list sorted by canonical key, each
//! edge written as `{u, v, sign}` with `u < v`. Two graphs with the same
//! nodes and edge signs always produce identical records, whatever order
//! they were built in.

use crate::edge::NodeId;
use crate::error::{GraphError, Result};
use crate::graph::SignedGraph;
use crate::sign::Sign;

/// One signed edge in the exchange format.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeRecord {
    pub u: String,
    pub v: String,
    pub sign: i64,
}

/// A whole graph in the exchange format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphRecord {
    pub nodes: Vec<String>,
    pub edges: Vec<EdgeRecord>,
}

impl From<&SignedGraph> for GraphRecord {
    fn from(graph: &SignedGraph) -> Self {
        let nodes = graph.nodes().map(|n| n.as_str().to_owned()).collect();
        let edges = graph
            .edges()
            .map(|(key, sign)| EdgeRecord {
                u: key.low().as_str().to_owned(),
                v: key.high().as_str().to_owned(),
                sign: i64::from(sign.value()),
            })
            .collect();
        Self { nodes, edges }
    }
}

impl From<SignedGraph> for GraphRecord {
    fn from(graph: SignedGraph) -> Self {
        Self::from(&graph)
    }
}

impl TryFrom<GraphRecord> for SignedGraph {
    type Error = GraphError;

    fn try_from(record: GraphRecord) -> Result<Self> {
        SignedGraph::from_record(&record)
    }
}

impl SignedGraph {
    /// Convert to the neutral exchange format.
    pub fn to_record(&self) -> GraphRecord {
        GraphRecord::from(self)
    }

    /// Build a graph from the neutral exchange format.
    ///
    /// Edge order in the record does not matter. Every sign is validated;
    /// the first invalid sign or self-loop aborts the conversion.
    pub fn from_record(record: &GraphRecord) -> Result<Self> {
        let mut graph = SignedGraph::new();
        for node in &record.nodes {
            graph.add_node(NodeId::from(node.as_str()));
        }
        for edge in &record.edges {
            let sign = Sign::try_from(edge.sign)?;
            graph.set_edge(edge.u.as_str(), edge.v.as_str(), sign)?;
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SignedGraph {
        let mut g = SignedGraph::new();
        g.add_edge("c", "a", 1).unwrap();
        g.add_edge("b", "a", -1).unwrap();
        g.add_edge("c", "b", 1).unwrap();
        g.add_node("z");
        g
    }

    #[test]
    fn record_is_sorted() {
        let record = sample().to_record();

        assert_eq!(record.nodes, vec!["a", "b", "c", "z"]);
        let pairs: Vec<(&str, &str, i64)> = record
            .edges
            .iter()
            .map(|e| (e.u.as_str(), e.v.as_str(), e.sign))
            .collect();
        assert_eq!(pairs, vec![("a", "b", -1), ("a", "c", 1), ("b", "c", 1)]);
    }

    #[test]
    fn record_ignores_insertion_order() {
        let mut other = SignedGraph::new();
        other.add_node("z");
        other.add_edge("b", "c", 1).unwrap();
        other.add_edge("a", "c", 1).unwrap();
        other.add_edge("a", "b", -1).unwrap();

        assert_eq!(other.to_record(), sample().to_record());
    }

    #[test]
    fn round_trip_preserves_graph() {
        let g = sample();
        let back = SignedGraph::from_record(&g.to_record()).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn invalid_sign_in_record_is_rejected() {
        let record = GraphRecord {
            nodes: vec!["a".into(), "b".into()],
            edges: vec![EdgeRecord { u: "a".into(), v: "b".into(), sign: 0 }],
        };
        assert_eq!(
            SignedGraph::try_from(record),
            Err(GraphError::InvalidSign(0))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_goes_through_record() {
        let g = sample();
        let json = serde_json::to_string(&g).unwrap();
        assert!(json.contains("\"nodes\":[\"a\",\"b\",\"c\",\"z\"]"));
        assert!(json.contains("{\"u\":\"a\",\"v\":\"b\",\"sign\":-1}"));

        let parsed: SignedGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, g);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_with_bad_sign_fails() {
        let json = r#"{"nodes":["a","b"],"edges":[{"u":"a","v":"b","sign":3}]}"#;
        assert!(serde_json::from_str::<SignedGraph>(json).is_err());
    }
}
