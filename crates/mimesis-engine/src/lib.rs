//! Mimesis Engines
//!
//! Two ways a signed community reacts to a disturbance:
//!
//! - [`CascadeEngine`]: one edge is perturbed, then round after round a single
//!   pressured actor flips one of its own edges, chosen globally by triangle
//!   delta under a rationality knob, until nobody is pressured or the step
//!   budget runs out.
//! - [`ContagionEngine`]: one member accuses another, and the accusation
//!   spreads along friendships in a single breadth-first pass followed by a
//!   cleanup that unites the accusers.
//!
//! Both engines copy the caller's graph on construction and return immutable
//! result records that serialize to the JSON report format.
//!
//! ```no_run
//! use mimesis_engine::{CascadeConfig, CascadeEngine, Sign, SignedGraph};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let graph = SignedGraph::complete(["Alice", "Betty", "Charlie", "David"], Sign::Positive)?;
//! let config = CascadeConfig::new(1000, 1.0)?;
//! let result = CascadeEngine::new(&graph, config, StdRng::seed_from_u64(42))?
//!     .introduce_perturbation("Alice", "Betty")?;
//! assert!(result.converged);
//! # Ok::<(), mimesis_engine::EngineError>(())
//! ```

mod cascade;
mod config;
mod contagion;
mod error;
mod records;

pub use cascade::{CascadeEngine, STUCK_DELTA};
pub use config::{
    parse_var, CascadeConfig, SelectionPolicy, DEFAULT_MAX_STEPS, DEFAULT_RATIONALITY, ENV_MAX_STEPS,
    ENV_RATIONALITY, SOFTMAX_EPSILON,
};
pub use contagion::ContagionEngine;
pub use error::{EngineError, Result};
pub use records::{
    Accusation, CascadeResult, CascadeStep, ContagionDecision, ContagionPhase, ContagionWarning,
    Perturbation, ScapegoatResult, StepRecord,
};

pub use mimesis_balance::{ContagionAction, DecisionContext, FlipIntent, FlipOption, NoOpReason};
pub use mimesis_graph::{EdgeKey, GraphError, GraphRecord, NodeId, Sign, SignedGraph};
