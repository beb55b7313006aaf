//! Step, decision and result records handed to reporting.
//!
//! Records are plain data. Engines build them; nothing in them refers back to
//! live engine state. All of them serialize to the JSON report format.

use std::collections::BTreeSet;
use std::fmt;

use mimesis_balance::{count_unbalanced, ContagionAction, DecisionContext, FlipIntent};
use mimesis_graph::{EdgeKey, NodeId, Sign, SignedGraph, NO_EDGE};
use serde::{Serialize, Serializer};

/// Common view over cascade steps and contagion decisions.
pub trait StepRecord {
    /// The node that acted (or failed to).
    fn actor(&self) -> &NodeId;

    /// The edge affected, if any.
    fn edge(&self) -> Option<&EdgeKey>;

    /// Sign before the action; `None` if the edge did not exist.
    fn old_sign(&self) -> Option<Sign>;

    /// Sign after the action.
    fn new_sign(&self) -> Option<Sign>;

    /// Free-text explanation.
    fn reason(&self) -> String;

    /// The actor had no legal action.
    fn is_stuck(&self) -> bool;

    /// The record changed the graph.
    fn is_change(&self) -> bool {
        self.edge().is_some() && self.new_sign().is_some() && !self.is_stuck()
    }
}

fn sign_or_zero<S: Serializer>(sign: &Option<Sign>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i8(sign.map_or(NO_EDGE, Sign::value))
}

/// The edge flipped to start a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Perturbation {
    pub edge: EdgeKey,
    pub from_sign: Sign,
    pub to_sign: Sign,
}

/// One round of a cascade: either a flip or a stuck actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeStep {
    /// 1-based step number.
    pub step: usize,
    pub actor: NodeId,
    pub edge: Option<EdgeKey>,
    #[serde(rename = "from_sign", serialize_with = "sign_or_zero")]
    pub old_sign: Option<Sign>,
    #[serde(rename = "to_sign", serialize_with = "sign_or_zero")]
    pub new_sign: Option<Sign>,
    /// Triangle delta the move was selected with.
    pub delta: i64,
    /// Nodes pressured after this step that were not pressured before it.
    #[serde(rename = "new_pressured")]
    pub newly_pressured: BTreeSet<NodeId>,
    pub stuck: bool,
    #[serde(skip)]
    pub context: DecisionContext,
}

impl StepRecord for CascadeStep {
    fn actor(&self) -> &NodeId {
        &self.actor
    }

    fn edge(&self) -> Option<&EdgeKey> {
        self.edge.as_ref()
    }

    fn old_sign(&self) -> Option<Sign> {
        self.old_sign
    }

    fn new_sign(&self) -> Option<Sign> {
        self.new_sign
    }

    fn reason(&self) -> String {
        match &self.context.chosen {
            Some(option) => {
                let verb = match option.intent() {
                    FlipIntent::Break => "breaks with",
                    FlipIntent::Ally => "allies with",
                };
                format!(
                    "{} {verb} {} (score {})",
                    self.actor, option.target, option.target_score
                )
            }
            None => format!("{} is stuck: no legal flip", self.actor),
        }
    }

    fn is_stuck(&self) -> bool {
        self.stuck
    }
}

/// Outcome of a cascade run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeResult {
    pub initial_state: SignedGraph,
    /// `None` when the run started from the current state.
    pub perturbation: Option<Perturbation>,
    #[serde(rename = "cascade")]
    pub steps: Vec<CascadeStep>,
    pub final_state: SignedGraph,
    /// The round loop found no pressured node before the budget ran out.
    pub converged: bool,
    pub total_steps: usize,
    pub stuck_steps: usize,
}

impl CascadeResult {
    pub(crate) fn new(
        initial_state: SignedGraph,
        perturbation: Option<Perturbation>,
        steps: Vec<CascadeStep>,
        final_state: SignedGraph,
        converged: bool,
    ) -> Self {
        let total_steps = steps.len();
        let stuck_steps = steps.iter().filter(|s| s.stuck).count();
        Self {
            initial_state,
            perturbation,
            steps,
            final_state,
            converged,
            total_steps,
            stuck_steps,
        }
    }

    /// Steps that actually flipped an edge.
    pub fn flips(&self) -> impl Iterator<Item = &CascadeStep> {
        self.steps.iter().filter(|s| !s.stuck)
    }

    pub fn unbalanced_remaining(&self) -> usize {
        count_unbalanced(&self.final_state)
    }

    pub fn is_balanced(&self) -> bool {
        self.unbalanced_remaining() == 0
    }
}

/// The edge flipped (or created) to start a scapegoat run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Accusation {
    pub edge: EdgeKey,
    /// Sign before the accusation; 0 if the pair had no edge.
    #[serde(serialize_with = "sign_or_zero")]
    pub from_sign: Option<Sign>,
}

/// Which pass of the contagion engine produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContagionPhase {
    /// Breadth-first traversal along friendships from the accuser.
    Traversal,
    /// Nodes the traversal never reached.
    Unreached,
    /// Final resolution of remaining all-enemy triangles with the scapegoat.
    Cleanup,
}

/// One decision of a scapegoat run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContagionDecision {
    pub node: NodeId,
    pub action: ContagionAction,
    pub phase: ContagionPhase,
    pub edge: Option<EdgeKey>,
    #[serde(rename = "from_sign", serialize_with = "sign_or_zero")]
    pub old_sign: Option<Sign>,
    #[serde(rename = "to_sign", serialize_with = "sign_or_zero")]
    pub new_sign: Option<Sign>,
    pub reason: String,
}

impl ContagionDecision {
    pub(crate) fn new(
        node: NodeId,
        scapegoat: &NodeId,
        action: ContagionAction,
        phase: ContagionPhase,
    ) -> Self {
        let edge = action.edge(&node, scapegoat);
        let reason = match (&action, phase) {
            (ContagionAction::BefriendOther { other }, ContagionPhase::Cleanup) => {
                format!("community unity: {node} reconciles with {other} against {scapegoat}")
            }
            _ => action.describe(&node, scapegoat),
        };
        Self {
            old_sign: action.old_sign(),
            new_sign: action.new_sign(),
            node,
            action,
            phase,
            edge,
            reason,
        }
    }
}

impl StepRecord for ContagionDecision {
    fn actor(&self) -> &NodeId {
        &self.node
    }

    fn edge(&self) -> Option<&EdgeKey> {
        self.edge.as_ref()
    }

    fn old_sign(&self) -> Option<Sign> {
        self.old_sign
    }

    fn new_sign(&self) -> Option<Sign> {
        self.new_sign
    }

    fn reason(&self) -> String {
        self.reason.clone()
    }

    fn is_stuck(&self) -> bool {
        false
    }
}

/// Non-fatal conditions noticed during a scapegoat run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContagionWarning {
    /// The accuser has no friends, so the accusation cannot spread.
    IsolatedAccuser { accuser: NodeId },
}

impl fmt::Display for ContagionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContagionWarning::IsolatedAccuser { accuser } => {
                write!(f, "accuser {accuser} has no friends; the accusation cannot spread")
            }
        }
    }
}

/// Outcome of a scapegoat run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScapegoatResult {
    pub initial_state: SignedGraph,
    pub scapegoat: NodeId,
    pub accuser: NodeId,
    pub accusation: Accusation,
    pub decisions: Vec<ContagionDecision>,
    pub final_state: SignedGraph,
    /// Enemies of the scapegoat at the end of the run.
    pub accusers: BTreeSet<NodeId>,
    /// Friends of the scapegoat at the end of the run.
    pub defenders: BTreeSet<NodeId>,
    /// No unbalanced triangle remains.
    pub balanced: bool,
    /// Every other node is an enemy of the scapegoat.
    pub all_against_one: bool,
    /// The scapegoat has no friend left.
    pub contagion_succeeded: bool,
    pub warnings: Vec<ContagionWarning>,
}

impl ScapegoatResult {
    pub fn decisions_in(&self, phase: ContagionPhase) -> impl Iterator<Item = &ContagionDecision> {
        self.decisions.iter().filter(move |d| d.phase == phase)
    }

    /// Decisions that changed an edge.
    pub fn changes(&self) -> impl Iterator<Item = &ContagionDecision> {
        self.decisions.iter().filter(|d| d.is_change())
    }
}
