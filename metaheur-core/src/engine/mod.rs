//! Engines: orchestration of the evaluate/sample loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::monitor::EngineView;
use crate::problem::Problem;
use crate::snapshot::{EngineSnapshot, EngineState, SNAPSHOT_VERSION};

pub mod alternating;
pub mod default;
pub mod island;
pub mod restart;

/// Controls the population evaluation batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Evaluate individuals on the rayon thread pool. The batch is
    /// embarrassingly parallel; small populations fall back to
    /// sequential evaluation either way.
    pub parallel: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// An optimization engine driving one problem.
///
/// `optimize` runs the evaluate/sample loop until the engine's monitor
/// asks to stop; there is no engine-intrinsic stop criterion.
/// `update_fitness` and `next_iteration` are exposed separately so
/// composite engines can interleave their own policy between the two.
pub trait Engine<P: Problem>: Send {
    /// Engine name, used for log attribution.
    fn name(&self) -> &str;

    /// The problem this engine optimizes.
    fn problem(&self) -> &Arc<P>;

    /// Best folded fitness seen so far.
    fn best_fitness(&self) -> f64;

    /// Key vector of the best solution seen so far; empty before the
    /// first evaluation.
    fn best_solution(&self) -> ArrayView1<'_, f64>;

    /// Completed iterations.
    fn iterations(&self) -> u64;

    /// Objective evaluations so far.
    fn evaluations(&self) -> u64;

    /// Wall-clock time since [`begin`](Engine::begin).
    fn elapsed(&self) -> Duration;

    /// Evaluates the current population and folds the result into the
    /// best-so-far tracking.
    fn update_fitness(&mut self) -> Result<()>;

    /// Produces the next population; composite engines run their
    /// policy (restart, alternation, migration) here first.
    fn next_iteration(&mut self) -> Result<()>;

    /// Offers an externally-sourced individual. Returns `true` when it
    /// was admitted into the population.
    fn arrival(&mut self, solution: ArrayView1<'_, f64>, fitness: f64) -> bool;

    /// Whether this engine can admit immigrants at all.
    fn accepts_immigrants(&self) -> bool;

    /// Marks the start of an optimization run.
    fn begin(&mut self);

    /// Polls this engine's monitor with the current progress view.
    fn should_stop(&mut self) -> bool;

    /// Plain-data record of the engine's complete state.
    fn state_snapshot(&self) -> EngineState;

    /// Versioned snapshot for [`suspend_to`](crate::suspend_to).
    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            engine: self.state_snapshot(),
        }
    }

    /// Runs the loop to completion and decodes the best solution.
    fn optimize(&mut self) -> Result<P::Solution> {
        self.begin();
        loop {
            self.update_fitness()?;
            if self.should_stop() {
                break;
            }
            self.next_iteration()?;
        }
        Ok(self.problem().decode(self.best_solution()))
    }
}

/// State shared by every engine: the problem handle, best-so-far
/// tracking and counters.
pub(crate) struct EngineCore<P: Problem> {
    pub name: String,
    pub problem: Arc<P>,
    pub best_solution: Array1<f64>,
    pub best_fitness: f64,
    pub iterations: u64,
    pub evaluations: u64,
    pub started: Option<Instant>,
    pub eval: EvalConfig,
}

impl<P: Problem> EngineCore<P> {
    pub fn new(name: String, problem: Arc<P>, eval: EvalConfig) -> Self {
        Self {
            name,
            problem,
            best_solution: Array1::zeros(0),
            best_fitness: f64::MAX,
            iterations: 0,
            evaluations: 0,
            started: None,
            eval,
        }
    }

    /// Scores one population batch; embarrassingly parallel, with the
    /// best-update left to the caller.
    pub fn evaluate(&mut self, population: &Array2<f64>) -> Result<Array1<f64>> {
        let n = population.nrows();
        let scores: Vec<Result<f64>> = if self.eval.parallel && n >= 4 {
            (0..n)
                .into_par_iter()
                .map(|i| self.problem.evaluate(population.row(i)))
                .collect()
        } else {
            (0..n).map(|i| self.problem.evaluate(population.row(i))).collect()
        };
        self.evaluations += n as u64;
        let fitness = scores.into_iter().collect::<Result<Vec<f64>>>()?;
        Ok(Array1::from_vec(fitness))
    }

    /// Updates best solution and fitness together on strict
    /// improvement; ties keep the incumbent.
    pub fn absorb_best(&mut self, population: &Array2<f64>, fitness: &Array1<f64>) {
        let (index, value) = crate::sampler::argmin(fitness.view());
        if value < self.best_fitness || self.best_fitness == f64::MAX {
            self.best_fitness = value;
            self.best_solution = population.row(index).to_owned();
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.map_or(Duration::ZERO, |s| s.elapsed())
    }

    pub fn view(&self) -> EngineView<'_> {
        EngineView {
            name: &self.name,
            iterations: self.iterations,
            evaluations: self.evaluations,
            best_fitness: self.best_fitness,
            best_solution: self.best_solution.view(),
            elapsed: self.elapsed(),
        }
    }
}
