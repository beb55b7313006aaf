//! Cascade configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Default step budget.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Default rationality: halfway between random and optimal.
pub const DEFAULT_RATIONALITY: f64 = 0.5;

/// Added to the rationality before taking its reciprocal as the softmax
/// temperature.
pub const SOFTMAX_EPSILON: f64 = 0.01;

/// Environment variable holding the step budget.
pub const ENV_MAX_STEPS: &str = "MIMESIS_MAX_STEPS";

/// Environment variable holding the rationality.
pub const ENV_RATIONALITY: &str = "MIMESIS_RATIONALITY";

/// Configuration for a cascade run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeConfig {
    /// Maximum number of recorded steps (flips and stuck steps) per run.
    pub max_steps: usize,
    /// 1.0 picks the best move, 0.0 picks uniformly, anything between
    /// samples a softmax over triangle deltas.
    pub rationality: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            rationality: DEFAULT_RATIONALITY,
        }
    }
}

impl CascadeConfig {
    /// Create a validated configuration.
    pub fn new(max_steps: usize, rationality: f64) -> Result<Self> {
        let config = Self {
            max_steps,
            rationality,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject a rationality outside `[0, 1]` (NaN included).
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.rationality) {
            return Err(EngineError::InvalidRationality(self.rationality));
        }
        Ok(())
    }

    /// Load from `MIMESIS_MAX_STEPS` and `MIMESIS_RATIONALITY`, falling back
    /// to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            max_steps: parse_var(&lookup, ENV_MAX_STEPS)?.unwrap_or(defaults.max_steps),
            rationality: parse_var(&lookup, ENV_RATIONALITY)?.unwrap_or(defaults.rationality),
        };
        config.validate()?;
        Ok(config)
    }

    /// The selection policy implied by the rationality.
    pub fn policy(&self) -> SelectionPolicy {
        SelectionPolicy::from_rationality(self.rationality)
    }
}

/// Parse an optional variable, treating blank values as unset.
pub fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EngineError::Config(format!("{key}={raw:?} is not a valid value"))),
        _ => Ok(None),
    }
}

/// How one move is picked from a round's candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionPolicy {
    /// Highest triangle delta; the first candidate wins ties.
    Optimal,
    /// Uniform over all candidates.
    Random,
    /// Weight `exp((delta - max) / temperature)`.
    Softmax { temperature: f64 },
}

impl SelectionPolicy {
    pub fn from_rationality(rationality: f64) -> Self {
        if rationality >= 1.0 {
            SelectionPolicy::Optimal
        } else if rationality <= 0.0 {
            SelectionPolicy::Random
        } else {
            SelectionPolicy::Softmax {
                temperature: 1.0 / (rationality + SOFTMAX_EPSILON),
            }
        }
    }
}
