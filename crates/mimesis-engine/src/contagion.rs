//! Scapegoat contagion: one accusation spreads along friendships.
//!
//! The run has three passes over a private copy of the graph:
//!
//! - **traversal**: breadth-first from the accuser along positive edges. Each
//!   node is evaluated on first visit, before its friends are queued, so a
//!   node that just joined the accusers can inform the friends found after it.
//! - **unreached**: every node the traversal never reached, in id order.
//! - **cleanup**: every enemy of the scapegoat reconciles with each fellow
//!   enemy it still shares an all-negative triangle with the scapegoat.
//!
//! The scapegoat is never evaluated and never relays the accusation.

use std::collections::{BTreeSet, VecDeque};

use mimesis_balance::{all_negative_partners, count_unbalanced, evaluate_contagion, ContagionAction};
use mimesis_graph::{EdgeKey, GraphError, NodeId, Sign, SignedGraph};
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::records::{Accusation, ContagionDecision, ContagionPhase, ContagionWarning, ScapegoatResult};

/// Contagion engine over a private copy of a graph. Consumes no randomness.
pub struct ContagionEngine {
    initial: SignedGraph,
    graph: SignedGraph,
}

impl ContagionEngine {
    /// Copy `graph` and prepare a run. The caller's graph is never touched.
    pub fn new(graph: &SignedGraph) -> Self {
        Self {
            initial: graph.snapshot(),
            graph: graph.snapshot(),
        }
    }

    /// The working graph.
    pub fn graph(&self) -> &SignedGraph {
        &self.graph
    }

    /// `accuser` turns on `scapegoat`, and the accusation propagates.
    ///
    /// Both nodes must be in the graph and distinct. If they share no edge the
    /// accusation creates a negative one.
    pub fn introduce_accusation(
        self,
        scapegoat: impl Into<NodeId>,
        accuser: impl Into<NodeId>,
    ) -> Result<ScapegoatResult> {
        let scapegoat = scapegoat.into();
        let accuser = accuser.into();
        for node in [&scapegoat, &accuser] {
            if !self.graph.contains_node(node) {
                return Err(EngineError::UnknownNode(node.clone()));
            }
        }
        if scapegoat == accuser {
            return Err(GraphError::SelfLoop(accuser).into());
        }

        let mut run = Propagation {
            graph: self.graph,
            scapegoat,
            accusers: BTreeSet::new(),
            decisions: Vec::new(),
        };

        let accusation = run.accuse(&accuser)?;
        info!(scapegoat = %run.scapegoat, accuser = %accuser, "accusation introduced");

        let mut warnings = Vec::new();
        if run.graph.neighbors_with_sign(&accuser, Sign::Positive).next().is_none() {
            let warning = ContagionWarning::IsolatedAccuser {
                accuser: accuser.clone(),
            };
            warn!(accuser = %accuser, "{warning}");
            warnings.push(warning);
        }

        run.accusers.insert(accuser.clone());
        let enemies: Vec<NodeId> = run
            .graph
            .neighbors_with_sign(&run.scapegoat, Sign::Negative)
            .cloned()
            .collect();
        run.accusers.extend(enemies);

        let visited = run.traverse(&accuser)?;
        run.visit_unreached(&visited)?;
        run.cleanup()?;

        Ok(run.finish(self.initial, accuser, accusation, warnings))
    }
}

/// State of one scapegoat run.
struct Propagation {
    graph: SignedGraph,
    scapegoat: NodeId,
    accusers: BTreeSet<NodeId>,
    decisions: Vec<ContagionDecision>,
}

impl Propagation {
    fn accuse(&mut self, accuser: &NodeId) -> Result<Accusation> {
        let edge = EdgeKey::new(accuser, &self.scapegoat);
        let from_sign = self.graph.edge_by_key(&edge);
        if from_sign != Some(Sign::Negative) {
            self.graph
                .set_edge(accuser.clone(), self.scapegoat.clone(), Sign::Negative)?;
        }
        Ok(Accusation { edge, from_sign })
    }

    fn traverse(&mut self, accuser: &NodeId) -> Result<BTreeSet<NodeId>> {
        let mut visited = BTreeSet::from([self.scapegoat.clone(), accuser.clone()]);
        let mut queue = VecDeque::from([accuser.clone()]);

        while let Some(node) = queue.pop_front() {
            self.evaluate(&node, ContagionPhase::Traversal)?;

            let friends: Vec<NodeId> = self
                .graph
                .neighbors_with_sign(&node, Sign::Positive)
                .filter(|friend| !visited.contains(*friend))
                .cloned()
                .collect();
            for friend in friends {
                visited.insert(friend.clone());
                queue.push_back(friend);
            }
        }

        Ok(visited)
    }

    fn visit_unreached(&mut self, visited: &BTreeSet<NodeId>) -> Result<()> {
        let unreached: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|node| !visited.contains(*node))
            .cloned()
            .collect();
        for node in unreached {
            self.evaluate(&node, ContagionPhase::Unreached)?;
        }
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        let enemies: Vec<NodeId> = self
            .graph
            .neighbors_with_sign(&self.scapegoat, Sign::Negative)
            .cloned()
            .collect();

        for node in enemies {
            for other in all_negative_partners(&self.graph, &node, &self.scapegoat) {
                let action = ContagionAction::BefriendOther { other };
                self.apply(&node, &action)?;
                self.record(node.clone(), action, ContagionPhase::Cleanup);
            }
        }
        Ok(())
    }

    fn evaluate(&mut self, node: &NodeId, phase: ContagionPhase) -> Result<()> {
        let actions = evaluate_contagion(&self.graph, node, &self.scapegoat, &self.accusers);
        for action in actions {
            self.apply(node, &action)?;
            self.record(node.clone(), action, phase);
        }
        Ok(())
    }

    fn apply(&mut self, node: &NodeId, action: &ContagionAction) -> Result<()> {
        match action {
            ContagionAction::HearAccusation { .. } | ContagionAction::JoinAccusers { .. } => {
                self.graph
                    .set_edge(node.clone(), self.scapegoat.clone(), Sign::Negative)?;
                self.accusers.insert(node.clone());
            }
            ContagionAction::BefriendOther { other } => {
                self.graph.set_edge(node.clone(), other.clone(), Sign::Positive)?;
            }
            ContagionAction::NoOp { .. } => {}
        }
        Ok(())
    }

    fn record(&mut self, node: NodeId, action: ContagionAction, phase: ContagionPhase) {
        let decision = ContagionDecision::new(node, &self.scapegoat, action, phase);
        debug!(
            node = %decision.node,
            action = decision.action.tag(),
            phase = ?decision.phase,
            "{}",
            decision.reason
        );
        self.decisions.push(decision);
    }

    fn finish(
        self,
        initial: SignedGraph,
        accuser: NodeId,
        accusation: Accusation,
        warnings: Vec<ContagionWarning>,
    ) -> ScapegoatResult {
        let scapegoat = self.scapegoat;
        let graph = self.graph;

        let defenders: BTreeSet<NodeId> = graph
            .neighbors_with_sign(&scapegoat, Sign::Positive)
            .cloned()
            .collect();
        let all_against_one = graph
            .nodes()
            .filter(|node| **node != scapegoat)
            .all(|node| graph.edge(node, &scapegoat) == Some(Sign::Negative));
        let balanced = count_unbalanced(&graph) == 0;
        let contagion_succeeded = defenders.is_empty();

        info!(
            scapegoat = %scapegoat,
            accusers = self.accusers.len(),
            defenders = defenders.len(),
            decisions = self.decisions.len(),
            balanced,
            all_against_one,
            "contagion finished"
        );

        ScapegoatResult {
            initial_state: initial,
            scapegoat,
            accuser,
            accusation,
            decisions: self.decisions,
            final_state: graph,
            accusers: self.accusers,
            defenders,
            balanced,
            all_against_one,
            contagion_succeeded,
            warnings,
        }
    }
}
