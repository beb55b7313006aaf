//! Triangle enumeration, pressure detection, social scores, triangle delta.

use std::collections::{BTreeMap, BTreeSet};

use mimesis_graph::{EdgeKey, GraphError, NodeId, SignedGraph};

use crate::triangle::Triangle;

/// Every triangle in the graph.
///
/// Triangles are emitted in lexicographic order of their sorted member
/// triple, the same order as testing every 3-combination of the sorted node
/// list. Only neighbor pairs are visited, so sparse graphs stay cheap.
pub fn find_all_triangles(graph: &SignedGraph) -> Vec<Triangle> {
    let mut triangles = Vec::new();

    for a in graph.nodes() {
        let higher: Vec<&NodeId> = graph.neighbors(a).filter(|n| *n > a).collect();
        for (i, b) in higher.iter().enumerate() {
            for c in &higher[i + 1..] {
                if let Some(t) = Triangle::from_graph(graph, a, b, c) {
                    triangles.push(t);
                }
            }
        }
    }

    triangles
}

/// Every unbalanced triangle in the graph, in enumeration order.
pub fn unbalanced_triangles(graph: &SignedGraph) -> Vec<Triangle> {
    find_all_triangles(graph)
        .into_iter()
        .filter(Triangle::is_unbalanced)
        .collect()
}

pub fn count_unbalanced(graph: &SignedGraph) -> usize {
    find_all_triangles(graph)
        .iter()
        .filter(|t| t.is_unbalanced())
        .count()
}

/// Unbalanced triangles containing `node`, in enumeration order.
pub fn node_unbalanced_triangles(graph: &SignedGraph, node: &NodeId) -> Vec<Triangle> {
    let neighbors: Vec<&NodeId> = graph.neighbors(node).collect();
    let mut triangles = Vec::new();

    for (i, b) in neighbors.iter().enumerate() {
        for c in &neighbors[i + 1..] {
            if let Some(t) = Triangle::from_graph(graph, node, b, c) {
                if t.is_unbalanced() {
                    triangles.push(t);
                }
            }
        }
    }

    triangles.sort_by(|x, y| x.nodes().cmp(y.nodes()));
    triangles
}

/// Nodes belonging to at least one unbalanced triangle.
pub fn pressured_nodes(graph: &SignedGraph) -> BTreeSet<NodeId> {
    unbalanced_triangles(graph)
        .into_iter()
        .flat_map(|t| t.nodes().clone())
        .collect()
}

/// Triangles that contain the edge `key`, ordered by their third member.
pub fn edge_triangles(graph: &SignedGraph, key: &EdgeKey) -> Vec<Triangle> {
    let (u, v) = key.endpoints();
    graph
        .neighbors(u)
        .filter(|w| *w != v && graph.has_edge(v, w))
        .filter_map(|w| Triangle::from_graph(graph, u, v, w))
        .collect()
}

/// Friend count minus enemy count.
pub fn social_score(graph: &SignedGraph, node: &NodeId) -> i64 {
    let degree = graph.signed_degree(node);
    degree.positive as i64 - degree.negative as i64
}

/// Social score of every node.
pub fn all_scores(graph: &SignedGraph) -> BTreeMap<NodeId, i64> {
    graph
        .nodes()
        .map(|n| (n.clone(), social_score(graph, n)))
        .collect()
}

/// Change in unbalanced-triangle count if `key` were flipped; positive means
/// the flip would remove imbalance.
///
/// The flip is applied to an isolated copy, never to `graph`. Triangles that
/// do not contain the flipped edge are unchanged by it, so only the ones
/// through `key` are recounted.
pub fn triangle_delta(graph: &SignedGraph, key: &EdgeKey) -> Result<i64, GraphError> {
    let unbalanced_through = |g: &SignedGraph| {
        edge_triangles(g, key)
            .iter()
            .filter(|t| t.is_unbalanced())
            .count() as i64
    };

    let before = unbalanced_through(graph);
    let after = graph.speculate(|scratch| -> Result<i64, GraphError> {
        scratch.flip(key)?;
        Ok(unbalanced_through(&*scratch))
    })?;

    Ok(before - after)
}
