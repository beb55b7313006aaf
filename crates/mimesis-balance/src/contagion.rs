//! The scapegoat contagion rule.
//!
//! Evaluated once per community member while an accusation spreads along
//! friendship edges:
//!
//! | edge to scapegoat | friend among accusers | action |
//! |---|---|---|
//! | none | yes | `hear_accusation`: new enemy edge, join accusers |
//! | friend | yes | `join_accusers`: flip to enemy, join accusers |
//! | enemy | any | `befriend_other` for every `---` triangle with the scapegoat |
//! | friend | no | no-op, defender |
//! | none | no | no-op, no connection |
//!
//! The rule itself is pure: it inspects the graph and returns actions. The
//! caller applies them.

use std::collections::BTreeSet;
use std::fmt;

use mimesis_graph::{EdgeKey, NodeId, Sign, SignedGraph};

/// Why a member took no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NoOpReason {
    /// Already an enemy of the scapegoat and in no `---` triangle with it.
    AlreadyEnemyBalanced,
    /// Friend of the scapegoat with no friend among the accusers.
    Defender,
    /// No edge to the scapegoat and no friend among the accusers.
    NoConnection,
}

impl NoOpReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            NoOpReason::AlreadyEnemyBalanced => "already enemy, balanced",
            NoOpReason::Defender => "defender",
            NoOpReason::NoConnection => "no connection",
        }
    }
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One action produced by the contagion rule for a single member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "action", rename_all = "snake_case"))]
pub enum ContagionAction {
    /// Had no relationship with the scapegoat; becomes its enemy on a
    /// friend's word.
    HearAccusation { informant: NodeId },
    /// Was the scapegoat's friend; turns on it following a friend.
    JoinAccusers { informant: NodeId },
    /// Reconciles with `other`, a fellow enemy of the scapegoat.
    BefriendOther { other: NodeId },
    /// Nothing changes.
    NoOp { reason: NoOpReason },
}

impl ContagionAction {
    /// Snake-case action tag.
    pub const fn tag(&self) -> &'static str {
        match self {
            ContagionAction::HearAccusation { .. } => "hear_accusation",
            ContagionAction::JoinAccusers { .. } => "join_accusers",
            ContagionAction::BefriendOther { .. } => "befriend_other",
            ContagionAction::NoOp { .. } => "no_op",
        }
    }

    /// The edge this action touches when taken by `node`.
    pub fn edge(&self, node: &NodeId, scapegoat: &NodeId) -> Option<EdgeKey> {
        match self {
            ContagionAction::HearAccusation { .. } | ContagionAction::JoinAccusers { .. } => {
                Some(EdgeKey::new(node, scapegoat))
            }
            ContagionAction::BefriendOther { other } => Some(EdgeKey::new(node, other)),
            ContagionAction::NoOp { .. } => None,
        }
    }

    /// Sign of the touched edge before the action (`None` if it did not exist).
    pub const fn old_sign(&self) -> Option<Sign> {
        match self {
            ContagionAction::HearAccusation { .. } => None,
            ContagionAction::JoinAccusers { .. } => Some(Sign::Positive),
            ContagionAction::BefriendOther { .. } => Some(Sign::Negative),
            ContagionAction::NoOp { .. } => None,
        }
    }

    /// Sign of the touched edge after the action.
    pub const fn new_sign(&self) -> Option<Sign> {
        match self {
            ContagionAction::HearAccusation { .. } | ContagionAction::JoinAccusers { .. } => {
                Some(Sign::Negative)
            }
            ContagionAction::BefriendOther { .. } => Some(Sign::Positive),
            ContagionAction::NoOp { .. } => None,
        }
    }

    /// Whether the acting member becomes an accuser.
    pub const fn makes_accuser(&self) -> bool {
        matches!(
            self,
            ContagionAction::HearAccusation { .. } | ContagionAction::JoinAccusers { .. }
        )
    }

    /// Human-readable description of the action taken by `node`.
    pub fn describe(&self, node: &NodeId, scapegoat: &NodeId) -> String {
        match self {
            ContagionAction::HearAccusation { informant } => {
                format!("{node} hears the accusation against {scapegoat} from {informant}")
            }
            ContagionAction::JoinAccusers { informant } => {
                format!("{node} turns on {scapegoat}, following {informant}")
            }
            ContagionAction::BefriendOther { other } => {
                format!("{node} reconciles with {other} against {scapegoat}")
            }
            ContagionAction::NoOp { reason } => reason.as_str().to_owned(),
        }
    }
}

/// Every `t` such that `node`, `scapegoat` and `t` form an all-negative
/// triangle, in sorted order.
pub fn all_negative_partners(graph: &SignedGraph, node: &NodeId, scapegoat: &NodeId) -> Vec<NodeId> {
    if graph.edge(node, scapegoat) != Some(Sign::Negative) {
        return Vec::new();
    }
    graph
        .neighbors_with_sign(node, Sign::Negative)
        .filter(|t| *t != scapegoat && graph.edge(scapegoat, t) == Some(Sign::Negative))
        .cloned()
        .collect()
}

/// Apply the contagion rule to `node`.
///
/// Always returns at least one action. Several `BefriendOther` actions are
/// returned when `node` sits in several all-negative triangles with the
/// scapegoat.
pub fn evaluate_contagion(
    graph: &SignedGraph,
    node: &NodeId,
    scapegoat: &NodeId,
    accusers: &BTreeSet<NodeId>,
) -> Vec<ContagionAction> {
    debug_assert_ne!(node, scapegoat);

    let informant = graph
        .neighbors_with_sign(node, Sign::Positive)
        .find(|friend| accusers.contains(*friend))
        .cloned();

    match (graph.edge(node, scapegoat), informant) {
        (None, Some(informant)) => vec![ContagionAction::HearAccusation { informant }],
        (Some(Sign::Positive), Some(informant)) => vec![ContagionAction::JoinAccusers { informant }],
        (Some(Sign::Negative), _) => {
            let partners = all_negative_partners(graph, node, scapegoat);
            if partners.is_empty() {
                vec![ContagionAction::NoOp {
                    reason: NoOpReason::AlreadyEnemyBalanced,
                }]
            } else {
                partners
                    .into_iter()
                    .map(|other| ContagionAction::BefriendOther { other })
                    .collect()
            }
        }
        (Some(Sign::Positive), None) => vec![ContagionAction::NoOp {
            reason: NoOpReason::Defender,
        }],
        (None, None) => vec![ContagionAction::NoOp {
            reason: NoOpReason::NoConnection,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(name: &str) -> NodeId {
        NodeId::from(name)
    }

    fn accusers(names: &[&str]) -> BTreeSet<NodeId> {
        names.iter().map(|s| n(s)).collect()
    }

    #[test]
    fn stranger_hears_accusation_from_friend() {
        let mut g = SignedGraph::new();
        g.add_edge("acc", "s", -1).unwrap();
        g.add_edge("acc", "x", 1).unwrap();

        let actions = evaluate_contagion(&g, &n("x"), &n("s"), &accusers(&["acc"]));
        assert_eq!(actions, vec![ContagionAction::HearAccusation { informant: n("acc") }]);
        assert!(actions[0].makes_accuser());
        assert_eq!(actions[0].edge(&n("x"), &n("s")), Some(EdgeKey::new("s", "x")));
        assert_eq!(actions[0].old_sign(), None);
        assert_eq!(actions[0].new_sign(), Some(Sign::Negative));
    }

    #[test]
    fn friend_of_scapegoat_joins_accusers() {
        let mut g = SignedGraph::new();
        g.add_edge("acc", "s", -1).unwrap();
        g.add_edge("acc", "x", 1).unwrap();
        g.add_edge("x", "s", 1).unwrap();

        let actions = evaluate_contagion(&g, &n("x"), &n("s"), &accusers(&["acc"]));
        assert_eq!(actions, vec![ContagionAction::JoinAccusers { informant: n("acc") }]);
        assert_eq!(actions[0].old_sign(), Some(Sign::Positive));
    }

    #[test]
    fn enemy_befriends_every_fellow_enemy() {
        let mut g = SignedGraph::new();
        g.add_edge("x", "s", -1).unwrap();
        g.add_edge("y", "s", -1).unwrap();
        g.add_edge("z", "s", -1).unwrap();
        g.add_edge("x", "y", -1).unwrap();
        g.add_edge("x", "z", -1).unwrap();

        let actions = evaluate_contagion(&g, &n("x"), &n("s"), &accusers(&[]));
        assert_eq!(
            actions,
            vec![
                ContagionAction::BefriendOther { other: n("y") },
                ContagionAction::BefriendOther { other: n("z") },
            ]
        );
        assert!(!actions[0].makes_accuser());
        assert_eq!(actions[1].edge(&n("x"), &n("s")), Some(EdgeKey::new("x", "z")));
    }

    #[test]
    fn balanced_enemy_does_nothing() {
        let mut g = SignedGraph::new();
        g.add_edge("x", "s", -1).unwrap();
        g.add_edge("y", "s", -1).unwrap();
        g.add_edge("x", "y", 1).unwrap();

        let actions = evaluate_contagion(&g, &n("x"), &n("s"), &accusers(&["y"]));
        assert_eq!(
            actions,
            vec![ContagionAction::NoOp { reason: NoOpReason::AlreadyEnemyBalanced }]
        );
        assert_eq!(actions[0].describe(&n("x"), &n("s")), "already enemy, balanced");
    }

    #[test]
    fn friend_without_accuser_friends_defends() {
        let mut g = SignedGraph::new();
        g.add_edge("x", "s", 1).unwrap();
        g.add_edge("x", "y", 1).unwrap();

        let actions = evaluate_contagion(&g, &n("x"), &n("s"), &accusers(&["acc"]));
        assert_eq!(actions, vec![ContagionAction::NoOp { reason: NoOpReason::Defender }]);
    }

    #[test]
    fn disconnected_member_has_no_connection() {
        let mut g = SignedGraph::new();
        g.add_node("x");
        g.add_edge("acc", "s", -1).unwrap();

        let actions = evaluate_contagion(&g, &n("x"), &n("s"), &accusers(&["acc"]));
        assert_eq!(actions, vec![ContagionAction::NoOp { reason: NoOpReason::NoConnection }]);
        assert!(actions[0].edge(&n("x"), &n("s")).is_none());
    }

    #[test]
    fn enemy_accuser_is_not_an_informant() {
        let mut g = SignedGraph::new();
        g.add_edge("acc", "s", -1).unwrap();
        g.add_edge("acc", "x", -1).unwrap();
        g.add_edge("x", "s", 1).unwrap();

        let actions = evaluate_contagion(&g, &n("x"), &n("s"), &accusers(&["acc"]));
        assert_eq!(actions, vec![ContagionAction::NoOp { reason: NoOpReason::Defender }]);
    }

    #[test]
    fn partners_require_enemy_edge_to_scapegoat() {
        let mut g = SignedGraph::new();
        g.add_edge("x", "s", 1).unwrap();
        g.add_edge("y", "s", -1).unwrap();
        g.add_edge("x", "y", -1).unwrap();

        assert!(all_negative_partners(&g, &n("x"), &n("s")).is_empty());
        assert_eq!(all_negative_partners(&g, &n("y"), &n("s")), Vec::<NodeId>::new());
    }

    #[test]
    fn tags_are_stable() {
        assert_eq!(ContagionAction::HearAccusation { informant: n("a") }.tag(), "hear_accusation");
        assert_eq!(ContagionAction::JoinAccusers { informant: n("a") }.tag(), "join_accusers");
        assert_eq!(ContagionAction::BefriendOther { other: n("a") }.tag(), "befriend_other");
        assert_eq!(ContagionAction::NoOp { reason: NoOpReason::Defender }.tag(), "no_op");
    }
}
