//! How a pressured cascade actor chooses which edge to flip.
//!
//! # Rules
//!
//! 1. Candidates are the actor's edges to the other members of each of its
//!    unbalanced triangles, minus edges this actor has already flipped.
//! 2. **Break** candidates (currently friends) beat **ally** candidates
//!    (currently enemies).
//! 3. Among break candidates pick the lowest social score (easiest to
//!    ostracize); among ally candidates the highest (easiest to embrace).
//! 4. Ties are sorted by target id, then one index is drawn uniformly.
//!
//! An actor with no candidate is **stuck**.

use mimesis_graph::{EdgeKey, NodeId, Sign, SignedGraph};
use rand::Rng;
use tracing::trace;

use crate::analyzer::{node_unbalanced_triangles, social_score};
use crate::ledger::FlipLedger;
use crate::triangle::{Triangle, TriangleKind};

/// What flipping an edge means to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlipIntent {
    /// Turn a friend into an enemy.
    Break,
    /// Turn an enemy into a friend.
    Ally,
}

impl FlipIntent {
    pub const fn from_current(sign: Sign) -> Self {
        match sign {
            Sign::Positive => FlipIntent::Break,
            Sign::Negative => FlipIntent::Ally,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FlipIntent::Break => "break",
            FlipIntent::Ally => "ally",
        }
    }
}

/// One legal flip for an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlipOption {
    pub actor: NodeId,
    pub target: NodeId,
    pub edge: EdgeKey,
    pub current_sign: Sign,
    pub target_score: i64,
    /// Kind of the first unbalanced triangle that exposed this edge.
    pub triangle_kind: TriangleKind,
}

impl FlipOption {
    pub fn intent(&self) -> FlipIntent {
        FlipIntent::from_current(self.current_sign)
    }

    pub fn new_sign(&self) -> Sign {
        self.current_sign.flipped()
    }
}

/// Everything an actor looked at when deciding, for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionContext {
    pub actor: NodeId,
    /// Unbalanced triangles containing the actor.
    pub unbalanced: Vec<Triangle>,
    /// Legal flips, one per target, in discovery order.
    pub options: Vec<FlipOption>,
    /// The chosen flip, or `None` if the actor is stuck.
    pub chosen: Option<FlipOption>,
}

impl DecisionContext {
    pub fn is_stuck(&self) -> bool {
        self.chosen.is_none()
    }
}

/// Legal flips for `actor`, one per target.
///
/// Triangles are walked in enumeration order and each target is considered
/// once, at its first appearance, whether or not it turns out to be legal.
pub fn flip_options(graph: &SignedGraph, actor: &NodeId, ledger: &FlipLedger) -> Vec<FlipOption> {
    let unbalanced = node_unbalanced_triangles(graph, actor);
    options_from(graph, actor, ledger, &unbalanced)
}

fn options_from(
    graph: &SignedGraph,
    actor: &NodeId,
    ledger: &FlipLedger,
    unbalanced: &[Triangle],
) -> Vec<FlipOption> {
    let mut seen: Vec<&NodeId> = Vec::new();
    let mut options = Vec::new();

    for triangle in unbalanced {
        let Some(others) = triangle.others(actor) else {
            continue;
        };
        for target in others {
            if seen.contains(&target) {
                continue;
            }
            seen.push(target);

            let edge = EdgeKey::new(actor, target);
            if ledger.is_consumed(actor, &edge) {
                continue;
            }
            let Some(current_sign) = graph.edge_by_key(&edge) else {
                continue;
            };

            options.push(FlipOption {
                actor: actor.clone(),
                target: target.clone(),
                edge,
                current_sign,
                target_score: social_score(graph, target),
                triangle_kind: triangle.kind(),
            });
        }
    }

    options
}

/// Decide for `actor`, returning the full context.
///
/// Consumes exactly one `gen_range` draw from `rng` when the winning tier has
/// at least one candidate, and none when the actor is stuck.
pub fn decide<R>(graph: &SignedGraph, actor: &NodeId, ledger: &FlipLedger, rng: &mut R) -> DecisionContext
where
    R: Rng,
{
    let unbalanced = node_unbalanced_triangles(graph, actor);
    let options = options_from(graph, actor, ledger, &unbalanced);
    let chosen = pick(&options, rng);

    match &chosen {
        Some(opt) => trace!(
            actor = %actor,
            target = %opt.target,
            intent = opt.intent().as_str(),
            score = opt.target_score,
            "flip chosen"
        ),
        None => trace!(actor = %actor, triangles = unbalanced.len(), "actor stuck"),
    }

    DecisionContext {
        actor: actor.clone(),
        unbalanced,
        options,
        chosen,
    }
}

/// The flip `actor` would make, or `None` if it is stuck.
pub fn choose_flip<R>(graph: &SignedGraph, actor: &NodeId, ledger: &FlipLedger, rng: &mut R) -> Option<FlipOption>
where
    R: Rng,
{
    decide(graph, actor, ledger, rng).chosen
}

fn pick<R>(options: &[FlipOption], rng: &mut R) -> Option<FlipOption>
where
    R: Rng,
{
    let breaks: Vec<&FlipOption> = options
        .iter()
        .filter(|o| o.intent() == FlipIntent::Break)
        .collect();

    let (tier, best) = if breaks.is_empty() {
        let allies: Vec<&FlipOption> = options
            .iter()
            .filter(|o| o.intent() == FlipIntent::Ally)
            .collect();
        let best = allies.iter().map(|o| o.target_score).max()?;
        (allies, best)
    } else {
        let best = breaks.iter().map(|o| o.target_score).min()?;
        (breaks, best)
    };

    let mut candidates: Vec<&FlipOption> = tier
        .into_iter()
        .filter(|o| o.target_score == best)
        .collect();
    candidates.sort_by(|a, b| a.target.cmp(&b.target));

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index].clone())
}
