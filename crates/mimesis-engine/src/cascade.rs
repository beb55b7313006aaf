//! Round-based cascade propagation.
//!
//! Each round:
//!
//! 1. Compute the pressured set; stop as converged if it is empty.
//! 2. Every pressured actor, in ascending id order, picks its preferred flip
//!    (or is stuck).
//! 3. Every preferred flip is scored by its triangle delta; stuck actors get
//!    [`STUCK_DELTA`].
//! 4. One candidate is selected by the [`SelectionPolicy`].
//! 5. A stuck selection is recorded without mutation. Otherwise the flip is
//!    applied and `(actor, edge)` is consumed in the ledger.
//!
//! Stuck actors stay stuck: the ledger only grows, so an actor's legal
//! options never come back.

use std::collections::BTreeSet;

use mimesis_balance::{decide, pressured_nodes, triangle_delta, DecisionContext, FlipLedger};
use mimesis_graph::{EdgeKey, NodeId, SignedGraph};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::{debug, info};

use crate::config::{CascadeConfig, SelectionPolicy};
use crate::error::Result;
use crate::records::{CascadeResult, CascadeStep, Perturbation};

/// Delta assigned to a stuck actor so it is only chosen when nobody else can
/// act (under the optimal policy) or with vanishing probability (softmax).
pub const STUCK_DELTA: i64 = -1000;

/// One actor's candidate move for the current round.
#[derive(Debug)]
struct Candidate {
    actor: NodeId,
    context: DecisionContext,
    delta: i64,
}

/// Cascade engine over a private copy of a graph.
///
/// Randomness comes only from `rng`, in a fixed order per round: one tie-break
/// draw per pressured actor that has options (ascending actor id), then one
/// draw for selection unless the policy is optimal.
pub struct CascadeEngine<R> {
    initial: SignedGraph,
    graph: SignedGraph,
    config: CascadeConfig,
    policy: SelectionPolicy,
    ledger: FlipLedger,
    rng: R,
}

impl<R: Rng> CascadeEngine<R> {
    /// Copy `graph` and prepare a run. The caller's graph is never touched.
    pub fn new(graph: &SignedGraph, config: CascadeConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            initial: graph.snapshot(),
            graph: graph.snapshot(),
            policy: config.policy(),
            config,
            ledger: FlipLedger::new(),
            rng,
        })
    }

    /// The working graph.
    pub fn graph(&self) -> &SignedGraph {
        &self.graph
    }

    pub fn ledger(&self) -> &FlipLedger {
        &self.ledger
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Flip `u-v`, lock it for both endpoints, then propagate.
    ///
    /// Fails with a missing-edge error if there is no edge between `u` and `v`.
    pub fn introduce_perturbation(
        mut self,
        u: impl Into<NodeId>,
        v: impl Into<NodeId>,
    ) -> Result<CascadeResult> {
        let edge = EdgeKey::new(u, v);
        let to_sign = self.graph.flip(&edge)?;
        self.ledger.lock(&edge);

        info!(
            edge = %edge,
            to_sign = to_sign.value(),
            rationality = self.config.rationality,
            max_steps = self.config.max_steps,
            "perturbation introduced"
        );

        let perturbation = Perturbation {
            edge,
            from_sign: to_sign.flipped(),
            to_sign,
        };
        let (steps, converged) = self.propagate()?;
        Ok(CascadeResult::new(
            self.initial,
            Some(perturbation),
            steps,
            self.graph,
            converged,
        ))
    }

    /// Propagate from the graph as given, without a perturbation.
    pub fn run_from_current_state(mut self) -> Result<CascadeResult> {
        info!(
            rationality = self.config.rationality,
            max_steps = self.config.max_steps,
            "cascade started from current state"
        );
        let (steps, converged) = self.propagate()?;
        Ok(CascadeResult::new(self.initial, None, steps, self.graph, converged))
    }

    fn propagate(&mut self) -> Result<(Vec<CascadeStep>, bool)> {
        let mut steps = Vec::new();

        while steps.len() < self.config.max_steps {
            let pressured = pressured_nodes(&self.graph);
            if pressured.is_empty() {
                info!(steps = steps.len(), "cascade converged");
                return Ok((steps, true));
            }

            let mut candidates = self.collect_candidates(&pressured)?;
            let index = self.select(&candidates)?;
            let candidate = candidates.swap_remove(index);
            let step = self.execute(steps.len() + 1, candidate, &pressured)?;
            steps.push(step);
        }

        info!(steps = steps.len(), "step budget exhausted before convergence");
        Ok((steps, false))
    }

    fn collect_candidates(&mut self, pressured: &BTreeSet<NodeId>) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::with_capacity(pressured.len());
        for actor in pressured {
            let context = decide(&self.graph, actor, &self.ledger, &mut self.rng);
            let delta = match &context.chosen {
                Some(option) => triangle_delta(&self.graph, &option.edge)?,
                None => STUCK_DELTA,
            };
            candidates.push(Candidate {
                actor: actor.clone(),
                context,
                delta,
            });
        }
        Ok(candidates)
    }

    /// Index of the selected candidate. `candidates` is never empty.
    fn select(&mut self, candidates: &[Candidate]) -> Result<usize> {
        let index = match self.policy {
            SelectionPolicy::Optimal => {
                let mut best = 0;
                for (i, c) in candidates.iter().enumerate() {
                    if c.delta > candidates[best].delta {
                        best = i;
                    }
                }
                best
            }
            SelectionPolicy::Random => self.rng.gen_range(0..candidates.len()),
            SelectionPolicy::Softmax { temperature } => {
                let deltas: Vec<i64> = candidates.iter().map(|c| c.delta).collect();
                WeightedIndex::<f64>::new(softmax_weights(&deltas, temperature))?
                    .sample(&mut self.rng)
            }
        };
        Ok(index)
    }

    fn execute(
        &mut self,
        step: usize,
        candidate: Candidate,
        pressured_before: &BTreeSet<NodeId>,
    ) -> Result<CascadeStep> {
        let Candidate {
            actor,
            context,
            delta,
        } = candidate;

        let Some(option) = context.chosen.clone() else {
            debug!(step, actor = %actor, "selected actor is stuck");
            return Ok(CascadeStep {
                step,
                actor,
                edge: None,
                old_sign: None,
                new_sign: None,
                delta,
                newly_pressured: BTreeSet::new(),
                stuck: true,
                context,
            });
        };

        let new_sign = self.graph.flip(&option.edge)?;
        self.ledger.consume(&actor, &option.edge);

        let newly_pressured: BTreeSet<NodeId> = pressured_nodes(&self.graph)
            .difference(pressured_before)
            .cloned()
            .collect();

        debug!(
            step,
            actor = %actor,
            edge = %option.edge,
            to_sign = new_sign.value(),
            delta,
            newly_pressured = newly_pressured.len(),
            "flip applied"
        );

        Ok(CascadeStep {
            step,
            actor,
            edge: Some(option.edge),
            old_sign: Some(option.current_sign),
            new_sign: Some(new_sign),
            delta,
            newly_pressured,
            stuck: false,
            context,
        })
    }
}

/// Unnormalized softmax weights `exp((delta - max) / temperature)`.
///
/// The best delta always weighs exactly 1.
fn softmax_weights(deltas: &[i64], temperature: f64) -> Vec<f64> {
    let max = deltas.iter().copied().max().unwrap_or(0);
    deltas
        .iter()
        .map(|d| ((d - max) as f64 / temperature).exp())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimesis_balance::{count_unbalanced, FlipIntent};
    use mimesis_graph::Sign;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::records::StepRecord;

    fn n(name: &str) -> NodeId {
        NodeId::from(name)
    }

    fn four_friends() -> SignedGraph {
        SignedGraph::complete(["A", "B", "C", "D"], Sign::Positive).unwrap()
    }

    fn engine(graph: &SignedGraph, rationality: f64, seed: u64) -> CascadeEngine<StdRng> {
        let config = CascadeConfig::new(100, rationality).unwrap();
        CascadeEngine::new(graph, config, StdRng::seed_from_u64(seed)).unwrap()
    }

    fn candidates(deltas: &[i64]) -> Vec<Candidate> {
        deltas
            .iter()
            .enumerate()
            .map(|(i, &delta)| {
                let actor = n(&format!("x{i}"));
                Candidate {
                    context: DecisionContext {
                        actor: actor.clone(),
                        unbalanced: Vec::new(),
                        options: Vec::new(),
                        chosen: None,
                    },
                    actor,
                    delta,
                }
            })
            .collect()
    }

    /// How often each candidate index is selected over `rounds` selections.
    fn selection_counts(rationality: f64, deltas: &[i64], rounds: usize) -> Vec<usize> {
        let mut engine = engine(&four_friends(), rationality, 2024);
        let pool = candidates(deltas);
        let mut counts = vec![0; deltas.len()];
        for _ in 0..rounds {
            counts[engine.select(&pool).unwrap()] += 1;
        }
        counts
    }

    #[test]
    fn rational_four_node_cascade_isolates_the_perturber() {
        for seed in [1, 42, 1234] {
            let graph = four_friends();
            let result = engine(&graph, 1.0, seed)
                .introduce_perturbation("A", "B")
                .unwrap();

            assert!(result.converged, "seed {seed}");
            assert_eq!(result.total_steps, 2, "seed {seed}");
            assert!(result.steps.iter().all(|s| s.actor == n("A") && !s.stuck));
            assert_eq!(count_unbalanced(&result.final_state), 0);

            let fs = &result.final_state;
            for other in ["B", "C", "D"] {
                assert_eq!(fs.edge(&n("A"), &n(other)), Some(Sign::Negative));
            }
            assert_eq!(fs.edge(&n("B"), &n("C")), Some(Sign::Positive));
            assert_eq!(fs.edge(&n("B"), &n("D")), Some(Sign::Positive));
            assert_eq!(fs.edge(&n("C"), &n("D")), Some(Sign::Positive));
        }
    }

    #[test]
    fn caller_graph_is_untouched() {
        let graph = four_friends();
        let result = engine(&graph, 1.0, 7).introduce_perturbation("A", "B").unwrap();

        assert_eq!(graph, four_friends());
        assert_eq!(result.initial_state, graph);
        assert_ne!(result.final_state, graph);
    }

    #[test]
    fn perturbation_is_recorded() {
        let result = engine(&four_friends(), 1.0, 7)
            .introduce_perturbation("B", "A")
            .unwrap();

        let p = result.perturbation.as_ref().unwrap();
        assert_eq!(p.edge, EdgeKey::new("A", "B"));
        assert_eq!(p.from_sign, Sign::Positive);
        assert_eq!(p.to_sign, Sign::Negative);
    }

    #[test]
    fn perturbed_edge_is_never_flipped_again() {
        for seed in 0..10 {
            let result = engine(&four_friends(), 0.3, seed)
                .introduce_perturbation("A", "B")
                .unwrap();
            let locked = EdgeKey::new("A", "B");
            assert!(result.steps.iter().all(|s| s.edge.as_ref() != Some(&locked)));
        }
    }

    #[test]
    fn perturbing_missing_edge_fails() {
        let mut graph = four_friends();
        graph.add_node("E");
        let err = engine(&graph, 1.0, 1).introduce_perturbation("A", "E").unwrap_err();
        assert!(matches!(err, crate::EngineError::Graph(_)));
    }

    #[test]
    fn balanced_graph_converges_immediately() {
        let result = engine(&four_friends(), 0.5, 1).run_from_current_state().unwrap();
        assert!(result.converged);
        assert!(result.steps.is_empty());
        assert!(result.perturbation.is_none());
    }

    #[test]
    fn zero_budget_is_never_converged() {
        let config = CascadeConfig::new(0, 1.0).unwrap();
        let result = CascadeEngine::new(&four_friends(), config, StdRng::seed_from_u64(1))
            .unwrap()
            .run_from_current_state()
            .unwrap();
        assert!(!result.converged);
        assert_eq!(result.total_steps, 0);
    }

    #[test]
    fn run_from_current_state_resolves_existing_imbalance() {
        let mut graph = SignedGraph::complete(["a", "b", "c"], Sign::Negative).unwrap();
        graph.add_node("lonely");
        let result = engine(&graph, 1.0, 3).run_from_current_state().unwrap();

        assert!(result.converged);
        assert_eq!(result.total_steps, 1);
        let step = &result.steps[0];
        assert_eq!(step.context.chosen.as_ref().unwrap().intent(), FlipIntent::Ally);
        assert_eq!(step.old_sign, Some(Sign::Negative));
        assert_eq!(step.new_sign, Some(Sign::Positive));
        assert!(!result.steps.iter().any(|s| s.actor == n("lonely")));
    }

    #[test]
    fn truncated_run_reports_not_converged() {
        let config = CascadeConfig::new(1, 1.0).unwrap();
        let result = CascadeEngine::new(&four_friends(), config, StdRng::seed_from_u64(1))
            .unwrap()
            .introduce_perturbation("A", "B")
            .unwrap();
        assert!(!result.converged);
        assert_eq!(result.total_steps, 1);
        assert!(!result.is_balanced());
    }

    #[test]
    fn same_seed_same_trace() {
        let run = |seed| {
            engine(&four_friends(), 0.5, seed)
                .introduce_perturbation("A", "C")
                .unwrap()
        };
        assert_eq!(run(99), run(99));
    }

    #[test]
    fn random_policy_still_respects_no_reversal() {
        for seed in 0..20 {
            let graph = SignedGraph::complete(["a", "b", "c", "d", "e"], Sign::Positive).unwrap();
            let result = engine(&graph, 0.0, seed).introduce_perturbation("a", "b").unwrap();
            let mut seen = BTreeSet::new();
            for step in result.flips() {
                let pair = (step.actor.clone(), step.edge.clone().unwrap());
                assert!(seen.insert(pair), "seed {seed}: repeated flip");
            }
        }
    }

    #[test]
    fn stuck_steps_record_no_mutation() {
        // a-b-c is ---, every actor's options are locked out up front
        let graph = SignedGraph::complete(["a", "b", "c"], Sign::Negative).unwrap();
        let mut engine = engine(&graph, 1.0, 5);
        engine.ledger.lock(&EdgeKey::new("a", "b"));
        engine.ledger.lock(&EdgeKey::new("b", "c"));
        engine.ledger.lock(&EdgeKey::new("a", "c"));

        let result = engine.run_from_current_state().unwrap();
        assert!(!result.converged);
        assert_eq!(result.total_steps, 100);
        assert_eq!(result.stuck_steps, 100);
        assert!(result.steps.iter().all(|s| s.is_stuck() && s.delta == STUCK_DELTA));
        assert_eq!(result.final_state, graph);
    }

    #[test]
    fn flip_steps_report_newly_pressured() {
        let result = engine(&four_friends(), 1.0, 11)
            .introduce_perturbation("A", "B")
            .unwrap();
        // every node is pressured before each step, so nothing is new
        assert!(result.steps.iter().all(|s| s.newly_pressured.is_empty()));
        assert!(result.steps[0].reason().starts_with("A breaks with"));
    }

    #[test]
    fn optimal_selection_takes_first_best_without_drawing() {
        let mut engine = engine(&four_friends(), 1.0, 8);
        let pool = candidates(&[1, 3, 3, STUCK_DELTA]);
        assert_eq!(engine.select(&pool).unwrap(), 1);

        let mut untouched = StdRng::seed_from_u64(8);
        assert_eq!(engine.rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn random_selection_ignores_delta() {
        let counts = selection_counts(0.0, &[5, 0, STUCK_DELTA], 300);
        // uniform: each index expects 100 of 300
        for (i, count) in counts.iter().enumerate() {
            assert!(*count > 50, "index {i} chosen {count} times");
        }
    }

    #[test]
    fn softmax_weights_follow_temperature() {
        let temperature = 1.0 / (0.5 + crate::config::SOFTMAX_EPSILON);
        let weights = softmax_weights(&[2, 0, STUCK_DELTA], temperature);

        assert_eq!(weights[0], 1.0);
        assert!((weights[1] - (-2.0 / temperature).exp()).abs() < 1e-12);
        assert!(weights[2] > 0.0 && weights[2] < 1e-200);
        assert!(softmax_weights(&[], temperature).is_empty());
    }

    #[test]
    fn softmax_favors_best_move_more_as_rationality_rises() {
        let deltas = [2, 0, STUCK_DELTA];
        let rounds = 2000;
        let mut shares = Vec::new();
        for rationality in [0.2, 0.8] {
            let counts = selection_counts(rationality, &deltas, rounds);
            assert_eq!(counts[2], 0, "stuck actor picked at r = {rationality}");
            assert!(counts[1] > 0, "r = {rationality} never explored");

            let share = counts[0] as f64 / rounds as f64;
            let expected = 1.0 / (1.0 + (-2.0 * (rationality + 0.01)).exp());
            assert!(
                (share - expected).abs() < 0.05,
                "r = {rationality}: share {share}, expected {expected}"
            );
            shares.push(share);
        }
        assert!(shares[1] > shares[0]);
    }

    #[test]
    fn random_policy_sometimes_moves_a_different_actor() {
        // after perturbing A-B every pressured actor scores 0, optimal picks A
        let first_actors: BTreeSet<NodeId> = (0..50)
            .map(|seed| {
                let result = engine(&four_friends(), 0.0, seed)
                    .introduce_perturbation("A", "B")
                    .unwrap();
                result.steps[0].actor.clone()
            })
            .collect();
        assert!(first_actors.len() > 1);
        assert!(first_actors.iter().any(|actor| actor != &n("A")));
    }
}
