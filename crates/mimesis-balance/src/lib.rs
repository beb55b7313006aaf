//! Structural Balance Analysis
//!
//! A triangle of mutually connected nodes is **balanced** when it holds an
//! even number of enemy edges and **unbalanced** otherwise:
//!
//! ```text
//! +++   balanced     friends of friends
//! +--   balanced     common enemy unites two friends
//! ++-   unbalanced   two of my friends are enemies
//! ---   unbalanced   three mutual enemies
//! ```
//!
//! Any node in an unbalanced triangle is under **pressure** to flip one of
//! its own relationships. This crate answers the two questions an actor
//! faces:
//!
//! - **Cascade actors** ([`decide`], [`choose_flip`]): which of my edges in
//!   an unbalanced triangle do I flip? Breaking a friendship is preferred
//!   over forming one, the weakest target is ostracized first, the strongest
//!   is embraced first, and an actor never flips the same edge twice
//!   ([`FlipLedger`]).
//! - **Scapegoat contagion** ([`evaluate_contagion`]): having heard an
//!   accusation from a friend, do I join it, defend the scapegoat, or
//!   reconcile with a fellow accuser?
//!
//! # Determinism
//!
//! Enumeration runs over nodes in sorted order. The only randomness is the
//! tie-break inside [`decide`], drawn from a caller-supplied generator:
//! exactly one `gen_range` per decision that has at least one candidate.

mod analyzer;
mod contagion;
mod flip;
mod ledger;
mod triangle;

pub use analyzer::{
    all_scores, count_unbalanced, edge_triangles, find_all_triangles, node_unbalanced_triangles,
    pressured_nodes, social_score, triangle_delta, unbalanced_triangles,
};
pub use contagion::{all_negative_partners, evaluate_contagion, ContagionAction, NoOpReason};
pub use flip::{choose_flip, decide, flip_options, DecisionContext, FlipIntent, FlipOption};
pub use ledger::FlipLedger;
pub use triangle::{Triangle, TriangleKind};

pub use mimesis_graph::{EdgeKey, GraphError, NodeId, Sign, SignedGraph};
