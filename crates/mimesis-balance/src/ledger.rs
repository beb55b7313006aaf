//! The no-reversal ledger.
//!
//! An `(actor, edge)` pair may be consumed at most once for the lifetime of a
//! run. Consumption never expires, so an actor's set of legal flips only ever
//! shrinks.

use std::collections::BTreeSet;

use mimesis_graph::{EdgeKey, NodeId};

/// Record of which actors have already acted on which edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlipLedger {
    consumed: BTreeSet<(NodeId, EdgeKey)>,
}

impl FlipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `edge` as consumed by `actor`.
    ///
    /// Returns `false` if the pair was already consumed.
    pub fn consume(&mut self, actor: &NodeId, edge: &EdgeKey) -> bool {
        self.consumed.insert((actor.clone(), edge.clone()))
    }

    /// Lock `edge` for both of its endpoints.
    pub fn lock(&mut self, edge: &EdgeKey) {
        let (low, high) = edge.endpoints();
        self.consume(low, edge);
        self.consume(high, edge);
    }

    pub fn is_consumed(&self, actor: &NodeId, edge: &EdgeKey) -> bool {
        self.consumed.contains(&(actor.clone(), edge.clone()))
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_consumed_once() {
        let mut ledger = FlipLedger::new();
        let actor = NodeId::from("a");
        let edge = EdgeKey::new("a", "b");

        assert!(ledger.is_empty());
        assert!(!ledger.is_consumed(&actor, &edge));
        assert!(ledger.consume(&actor, &edge));
        assert!(!ledger.consume(&actor, &edge));
        assert!(ledger.is_consumed(&actor, &edge));
        assert!(!ledger.is_empty());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn consumption_is_per_actor() {
        let mut ledger = FlipLedger::new();
        let edge = EdgeKey::new("a", "b");
        ledger.consume(&"a".into(), &edge);

        assert!(!ledger.is_consumed(&"b".into(), &edge));
    }

    #[test]
    fn canonical_edge_regardless_of_direction() {
        let mut ledger = FlipLedger::new();
        ledger.consume(&"a".into(), &EdgeKey::new("b", "a"));
        assert!(ledger.is_consumed(&"a".into(), &EdgeKey::new("a", "b")));
    }

    #[test]
    fn lock_covers_both_endpoints() {
        let mut ledger = FlipLedger::new();
        let edge = EdgeKey::new("b", "a");
        ledger.lock(&edge);

        assert!(ledger.is_consumed(&"a".into(), &edge));
        assert!(ledger.is_consumed(&"b".into(), &edge));
        assert!(!ledger.is_consumed(&"c".into(), &edge));
        assert_eq!(ledger.len(), 2);
    }
}
