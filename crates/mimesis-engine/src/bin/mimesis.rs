//! Mimesis demo binary
//!
//! Builds a complete friendship graph, runs either a cascade or a scapegoat
//! contagion on it, and prints the JSON result to stdout.
//!
//! Environment:
//! - `MIMESIS_NODES`: comma-separated node names (default `Alice,Betty,Charlie,David`)
//! - `MIMESIS_SEED`: random seed (default 42)
//! - `MIMESIS_PERTURB`: `U:V` edge to perturb (default the first two nodes)
//! - `MIMESIS_SCAPEGOAT`: `SCAPEGOAT:ACCUSER`; runs contagion instead of a cascade
//! - `MIMESIS_MAX_STEPS`, `MIMESIS_RATIONALITY`: cascade settings

use mimesis_engine::{
    parse_var, CascadeConfig, CascadeEngine, ContagionEngine, EngineError, NodeId, Sign,
    SignedGraph,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_NODES: &str = "Alice,Betty,Charlie,David";
const DEFAULT_SEED: u64 = 42;

enum Mode {
    Cascade { u: NodeId, v: NodeId },
    Scapegoat { scapegoat: NodeId, accuser: NodeId },
}

struct RunConfig {
    nodes: Vec<NodeId>,
    seed: u64,
    cascade: CascadeConfig,
    mode: Mode,
}

impl RunConfig {
    fn from_env() -> Result<Self, EngineError> {
        let lookup = |key: &str| std::env::var(key).ok();

        let nodes: Vec<NodeId> = lookup("MIMESIS_NODES")
            .unwrap_or_else(|| DEFAULT_NODES.to_string())
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(NodeId::from)
            .collect();
        if nodes.len() < 2 {
            return Err(EngineError::Config(
                "MIMESIS_NODES needs at least two nodes".to_string(),
            ));
        }

        let seed = parse_var(&lookup, "MIMESIS_SEED")?.unwrap_or(DEFAULT_SEED);
        let cascade = CascadeConfig::from_lookup(lookup)?;

        let mode = match lookup("MIMESIS_SCAPEGOAT") {
            Some(raw) => {
                let (scapegoat, accuser) = parse_pair("MIMESIS_SCAPEGOAT", &raw)?;
                Mode::Scapegoat { scapegoat, accuser }
            }
            None => {
                let (u, v) = match lookup("MIMESIS_PERTURB") {
                    Some(raw) => parse_pair("MIMESIS_PERTURB", &raw)?,
                    None => (nodes[0].clone(), nodes[1].clone()),
                };
                Mode::Cascade { u, v }
            }
        };

        Ok(Self {
            nodes,
            seed,
            cascade,
            mode,
        })
    }
}

fn parse_pair(key: &str, raw: &str) -> Result<(NodeId, NodeId), EngineError> {
    match raw.split_once(':') {
        Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
            Ok((NodeId::from(a.trim()), NodeId::from(b.trim())))
        }
        _ => Err(EngineError::Config(format!("{key}={raw:?} must look like A:B"))),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mimesis=info,mimesis_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = RunConfig::from_env()?;
    tracing::info!(
        nodes = config.nodes.len(),
        seed = config.seed,
        "starting mimesis run"
    );

    let graph = SignedGraph::complete(config.nodes.iter().cloned(), Sign::Positive)?;

    let json = match config.mode {
        Mode::Cascade { u, v } => {
            let rng = StdRng::seed_from_u64(config.seed);
            let result =
                CascadeEngine::new(&graph, config.cascade, rng)?.introduce_perturbation(u, v)?;
            serde_json::to_string_pretty(&result)?
        }
        Mode::Scapegoat { scapegoat, accuser } => {
            let result = ContagionEngine::new(&graph).introduce_accusation(scapegoat, accuser)?;
            serde_json::to_string_pretty(&result)?
        }
    };

    println!("{json}");
    Ok(())
}
