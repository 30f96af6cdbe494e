//! The problem contract: decoding and scoring key vectors.

use std::fmt;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fitness assigned to out-of-range keys and infeasible solutions.
pub const WORST_FITNESS: f64 = f64::MAX;

/// Largest key value; keys live in the half-open interval `[0, 1)`.
pub(crate) const KEY_MAX: f64 = 1.0 - f64::EPSILON / 2.0;

/// Optimization direction.
///
/// Engines fold the goal into every score so that samplers only ever
/// see a minimize-only scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Goal {
    /// Smaller objective values are better.
    #[default]
    Minimize,
    /// Larger objective values are better.
    Maximize,
}

impl Goal {
    /// Folds the goal sign into an objective value.
    pub fn fold(self, objective: f64) -> f64 {
        match self {
            Goal::Minimize => objective,
            Goal::Maximize => -objective,
        }
    }
}

/// A black-box optimization problem over normalized key vectors.
///
/// `decode` must be a pure, total function of its input. `objective`
/// may be expensive; engines evaluate whole populations in parallel, so
/// implementations must be `Send + Sync`.
pub trait Problem: Send + Sync {
    /// Domain solution type produced by [`decode`](Problem::decode).
    type Solution: fmt::Debug;

    /// Number of key-vector coordinates.
    fn dimension(&self) -> usize;

    /// Optimization direction, folded into scores by the engine.
    fn goal(&self) -> Goal {
        Goal::Minimize
    }

    /// Maps a key vector with coordinates in `[0, 1)` to a domain
    /// solution.
    fn decode(&self, keys: ArrayView1<'_, f64>) -> Self::Solution;

    /// Domain cost of a decoded solution.
    fn objective(&self, solution: &Self::Solution) -> f64;

    /// Feasibility predicate; infeasible solutions score
    /// [`WORST_FITNESS`] rather than being rejected structurally.
    fn is_feasible(&self, _solution: &Self::Solution) -> bool {
        true
    }

    /// Scores one key vector on the folded minimize-only scale.
    ///
    /// Any coordinate outside `[0, 1)` short-circuits to
    /// [`WORST_FITNESS`] without decoding; samplers such as particle
    /// swarm overshoot bounds by design. A NaN objective is fatal.
    fn evaluate(&self, keys: ArrayView1<'_, f64>) -> Result<f64> {
        if keys.iter().any(|k| !(0.0..1.0).contains(k)) {
            return Ok(WORST_FITNESS);
        }
        let solution = self.decode(keys);
        if !self.is_feasible(&solution) {
            return Ok(WORST_FITNESS);
        }
        let f = self.goal().fold(self.objective(&solution));
        if f.is_nan() {
            return Err(Error::NanObjective {
                solution: format!("{solution:?}"),
            });
        }
        Ok(f)
    }
}
