//! Stagnation-triggered restart around the incumbent best.

use std::sync::Arc;
use std::time::Duration;

use ndarray::{ArrayView1, Axis};

use crate::engine::default::DefaultEngine;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::problem::Problem;
use crate::snapshot::{DefaultEngineState, EngineState};

/// Wraps a [`DefaultEngine`] and reseeds its population from the best
/// solution whenever the best fitness stagnates for too long.
///
/// The restart patience grows with runtime: a restart fires when the
/// stagnation count exceeds `threshold + iterations / threshold`, so a
/// long-running engine restarts progressively less often. This guards
/// adaptive samplers such as CMA-ES against premature convergence.
pub struct RestartEngine<P: Problem> {
    inner: DefaultEngine<P>,
    threshold: u64,
    stagnation: u64,
    total_stagnation: u64,
}

impl<P: Problem> RestartEngine<P> {
    /// Creates a restart engine; `threshold` is the base stagnation
    /// patience and must be positive.
    pub fn new(
        name: impl Into<String>,
        problem: Arc<P>,
        sampler: Box<dyn crate::sampler::Sampler>,
        monitor: Box<dyn Monitor>,
        threshold: u64,
        seed: u64,
    ) -> Result<Self> {
        if threshold == 0 {
            return Err(Error::InvalidInterval {
                name: "restart threshold",
            });
        }
        Ok(Self {
            inner: DefaultEngine::new(name, problem, sampler, monitor, seed)?,
            threshold,
            stagnation: 0,
            total_stagnation: 0,
        })
    }

    /// Iterations since the best fitness last improved.
    pub fn stagnation(&self) -> u64 {
        self.stagnation
    }

    /// Cumulative stagnation over the whole run.
    pub fn total_stagnation(&self) -> u64 {
        self.total_stagnation
    }

    fn restart_if_stagnant(&mut self) -> Result<()> {
        let patience = self.threshold + self.inner.iterations() / self.threshold;
        if self.stagnation > patience {
            self.inner.monitor.log(
                log::Level::Info,
                self.inner.name(),
                &format!(
                    "restart at iteration [{}] after [{}] stagnant iterations",
                    self.inner.iterations(),
                    self.stagnation
                ),
            );
            let best = self.inner.best_solution().to_owned();
            let seeds = best.insert_axis(Axis(0));
            self.inner.reseed_guided(seeds.view());
            self.update_fitness()?;
            self.stagnation = 0;
        }
        Ok(())
    }

    pub(crate) fn restore_parts(
        state: DefaultEngineState,
        threshold: u64,
        stagnation: u64,
        total_stagnation: u64,
        problem: Arc<P>,
        monitor: Box<dyn Monitor>,
    ) -> Result<Self> {
        Ok(Self {
            inner: DefaultEngine::restore_parts(state, problem, monitor)?,
            threshold,
            stagnation,
            total_stagnation,
        })
    }
}

impl<P: Problem> Engine<P> for RestartEngine<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn problem(&self) -> &Arc<P> {
        self.inner.problem()
    }

    fn best_fitness(&self) -> f64 {
        self.inner.best_fitness()
    }

    fn best_solution(&self) -> ArrayView1<'_, f64> {
        self.inner.best_solution()
    }

    fn iterations(&self) -> u64 {
        self.inner.iterations()
    }

    fn evaluations(&self) -> u64 {
        self.inner.evaluations()
    }

    fn elapsed(&self) -> Duration {
        self.inner.elapsed()
    }

    fn update_fitness(&mut self) -> Result<()> {
        let last_best = self.inner.best_fitness();
        self.inner.update_fitness()?;
        if self.inner.best_fitness() < last_best {
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
            self.total_stagnation += self.stagnation;
        }
        Ok(())
    }

    fn next_iteration(&mut self) -> Result<()> {
        self.restart_if_stagnant()?;
        self.inner.next_iteration()
    }

    fn arrival(&mut self, solution: ArrayView1<'_, f64>, fitness: f64) -> bool {
        self.inner.arrival(solution, fitness)
    }

    fn accepts_immigrants(&self) -> bool {
        self.inner.accepts_immigrants()
    }

    fn begin(&mut self) {
        self.inner.begin();
    }

    fn should_stop(&mut self) -> bool {
        self.inner.should_stop()
    }

    fn state_snapshot(&self) -> EngineState {
        EngineState::Restart {
            inner: self.inner.state_parts(),
            threshold: self.threshold,
            stagnation: self.stagnation,
            total_stagnation: self.total_stagnation,
        }
    }
}
