//! Shared fixtures for the cross-crate tests.

use mimesis_graph::{Result, Sign, SignedGraph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Node names `n0`, `n1`, ... `n{count-1}`.
pub fn names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("n{i}")).collect()
}

/// Complete graph whose signs are drawn from `seed`, each edge negative with
/// probability `negative`.
pub fn random_complete(count: usize, negative: f64, seed: u64) -> Result<SignedGraph> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = SignedGraph::new();
    let nodes = names(count);
    for node in &nodes {
        graph.add_node(node.as_str());
    }
    for (i, u) in nodes.iter().enumerate() {
        for v in &nodes[i + 1..] {
            let sign = if rng.gen_bool(negative) { Sign::Negative } else { Sign::Positive };
            graph.set_edge(u.as_str(), v.as_str(), sign)?;
        }
    }
    Ok(graph)
}

/// Graph where each pair is joined with probability `density`, half the
/// edges negative.
pub fn random_sparse(count: usize, density: f64, seed: u64) -> Result<SignedGraph> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = SignedGraph::new();
    let nodes = names(count);
    for node in &nodes {
        graph.add_node(node.as_str());
    }
    for (i, u) in nodes.iter().enumerate() {
        for v in &nodes[i + 1..] {
            if rng.gen_bool(density) {
                let sign = if rng.gen_bool(0.5) { Sign::Negative } else { Sign::Positive };
                graph.set_edge(u.as_str(), v.as_str(), sign)?;
            }
        }
    }
    Ok(graph)
}
