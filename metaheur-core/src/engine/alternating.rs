//! Stagnation-triggered alternation over a pool of samplers.

use std::sync::Arc;
use std::time::Duration;

use ndarray::{Array2, ArrayView1};

use crate::engine::default::DefaultEngine;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::problem::Problem;
use crate::sampler::{sorted_indices, Sampler};
use crate::snapshot::EngineState;

/// Wraps a [`DefaultEngine`] over a pool of samplers and switches to
/// the next one, round-robin, whenever the best fitness stagnates past
/// the threshold.
///
/// The incoming sampler is seeded with the top-K fittest individuals of
/// the current population (K capped by the new sampler's population
/// size), so switching operator family never abandons the best-known
/// region. All samplers must share the problem's dimensionality.
pub struct AlternatingEngine<P: Problem> {
    inner: DefaultEngine<P>,
    /// Inactive samplers; the active slot holds `None` while the
    /// engine borrows it.
    pool: Vec<Option<Box<dyn Sampler>>>,
    active: usize,
    threshold: u64,
    stagnation: u64,
}

impl<P: Problem> AlternatingEngine<P> {
    /// Creates an alternating engine starting on the first sampler of
    /// the pool.
    pub fn new(
        name: impl Into<String>,
        problem: Arc<P>,
        samplers: Vec<Box<dyn Sampler>>,
        monitor: Box<dyn Monitor>,
        threshold: u64,
        seed: u64,
    ) -> Result<Self> {
        if samplers.is_empty() {
            return Err(Error::EmptyComposition { what: "sampler" });
        }
        if threshold == 0 {
            return Err(Error::InvalidInterval {
                name: "alternation threshold",
            });
        }
        let expected = samplers[0].dimension();
        for sampler in &samplers {
            if sampler.dimension() != expected {
                return Err(Error::DimensionMismatch {
                    expected,
                    got: sampler.dimension(),
                });
            }
        }
        let mut pool: Vec<Option<Box<dyn Sampler>>> = samplers.into_iter().map(Some).collect();
        let first = pool[0].take().expect("pool slot 0 occupied");
        Ok(Self {
            inner: DefaultEngine::new(name, problem, first, monitor, seed)?,
            pool,
            active: 0,
            threshold,
            stagnation: 0,
        })
    }

    /// Index of the currently active sampler in the pool.
    pub fn active_sampler(&self) -> usize {
        self.active
    }

    /// Iterations since the best fitness last improved.
    pub fn stagnation(&self) -> u64 {
        self.stagnation
    }

    fn alternate_if_stagnant(&mut self) -> Result<()> {
        if self.stagnation <= self.threshold {
            return Ok(());
        }
        let next = (self.active + 1) % self.pool.len();
        if next != self.active {
            let incoming = self.pool[next].take().expect("inactive slot occupied");
            let outgoing = self.inner.replace_sampler(incoming);
            self.pool[self.active] = Some(outgoing);
            self.active = next;
        }

        // Seed the incoming sampler with the fittest individuals.
        let ranked = sorted_indices(self.inner.fitness());
        let population = self.inner.population();
        let k = self
            .inner
            .sampler_population()
            .min(population.nrows());
        let mut seeds = Array2::<f64>::zeros((k, population.ncols()));
        for (row, &index) in ranked[..k].iter().enumerate() {
            seeds.row_mut(row).assign(&population.row(index));
        }
        self.inner.monitor.log(
            log::Level::Info,
            self.inner.name(),
            &format!(
                "alternated to sampler [{}] seeded with [{}] individuals",
                self.active, k
            ),
        );
        self.inner.reseed_guided(seeds.view());
        self.update_fitness()?;
        self.stagnation = 0;
        Ok(())
    }

    pub(crate) fn restore_parts(
        inner: DefaultEngine<P>,
        pool: Vec<Option<Box<dyn Sampler>>>,
        active: usize,
        threshold: u64,
        stagnation: u64,
    ) -> Self {
        Self {
            inner,
            pool,
            active,
            threshold,
            stagnation,
        }
    }
}

impl<P: Problem> Engine<P> for AlternatingEngine<P> {
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
        }
        Ok(())
    }

    fn next_iteration(&mut self) -> Result<()> {
        self.alternate_if_stagnant()?;
        self.inner.next_iteration()
    }

    fn arrival(&mut self, _solution: ArrayView1<'_, f64>, _fitness: f64) -> bool {
        // Alternation reseeds populations wholesale; an immigrant would
        // not survive the next switch.
        false
    }

    fn accepts_immigrants(&self) -> bool {
        false
    }

    fn begin(&mut self) {
        self.inner.begin();
    }

    fn should_stop(&mut self) -> bool {
        self.inner.should_stop()
    }

    fn state_snapshot(&self) -> EngineState {
        EngineState::Alternating {
            inner: self.inner.state_parts(),
            pool: self
                .pool
                .iter()
                .map(|slot| slot.as_ref().map(|s| s.snapshot()))
                .collect(),
            active: self.active,
            threshold: self.threshold,
            stagnation: self.stagnation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::StoppingMonitor;
    use crate::problem::Goal;
    use crate::sampler::{BiasedGeneticAlgorithm, DifferentialEvolution, ParticleSwarm};

    struct Flatline;

    impl Problem for Flatline {
        type Solution = f64;
        fn dimension(&self) -> usize {
            4
        }
        fn goal(&self) -> Goal {
            Goal::Minimize
        }
        fn decode(&self, keys: ArrayView1<'_, f64>) -> f64 {
            keys[0]
        }
        fn objective(&self, _x: &f64) -> f64 {
            1.0
        }
    }

    fn pool() -> Vec<Box<dyn Sampler>> {
        vec![
            Box::new(BiasedGeneticAlgorithm::new(4, 12, 0).unwrap()),
            Box::new(DifferentialEvolution::new(4, 8, 1).unwrap()),
            Box::new(ParticleSwarm::new(4, 10, 2).unwrap()),
        ]
    }

    #[test]
    fn rejects_empty_pool_and_mixed_dimensions() {
        let monitor = Box::new(StoppingMonitor::new());
        assert!(matches!(
            AlternatingEngine::new("a", Arc::new(Flatline), vec![], monitor, 5, 0),
            Err(Error::EmptyComposition { .. })
        ));

        let mixed: Vec<Box<dyn Sampler>> = vec![
            Box::new(BiasedGeneticAlgorithm::new(4, 12, 0).unwrap()),
            Box::new(BiasedGeneticAlgorithm::new(5, 12, 0).unwrap()),
        ];
        let monitor = Box::new(StoppingMonitor::new());
        assert!(matches!(
            AlternatingEngine::new("a", Arc::new(Flatline), mixed, monitor, 5, 0),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn alternates_round_robin_on_stagnation() {
        let monitor = Box::new(StoppingMonitor::new());
        let mut engine =
            AlternatingEngine::new("alt", Arc::new(Flatline), pool(), monitor, 2, 0).unwrap();
        engine.begin();
        engine.update_fitness().unwrap();
        assert_eq!(engine.active_sampler(), 0);

        let mut seen = vec![0];
        for _ in 0..20 {
            engine.next_iteration().unwrap();
            engine.update_fitness().unwrap();
            if *seen.last().unwrap() != engine.active_sampler() {
                seen.push(engine.active_sampler());
            }
        }
        // Flat fitness forces repeated alternation through the pool.
        assert!(seen.len() >= 3, "saw switches: {seen:?}");
        assert_eq!(seen[1], 1);
        assert_eq!(seen[2], 2);
    }

    #[test]
    fn population_follows_new_sampler_size() {
        let monitor = Box::new(StoppingMonitor::new());
        let mut engine =
            AlternatingEngine::new("alt", Arc::new(Flatline), pool(), monitor, 1, 0).unwrap();
        engine.begin();
        engine.update_fitness().unwrap();
        for _ in 0..10 {
            engine.next_iteration().unwrap();
            engine.update_fitness().unwrap();
            let expected = match engine.active_sampler() {
                0 => 12,
                1 => 8,
                _ => 10,
            };
            assert_eq!(engine.inner.population().nrows(), expected);
        }
    }

    #[test]
    fn never_accepts_immigrants() {
        let monitor = Box::new(StoppingMonitor::new());
        let mut engine =
            AlternatingEngine::new("alt", Arc::new(Flatline), pool(), monitor, 5, 0).unwrap();
        engine.update_fitness().unwrap();
        let migrant = ndarray::array![0.1, 0.2, 0.3, 0.4];
        assert!(!engine.arrival(migrant.view(), 0.0));
        assert!(!engine.accepts_immigrants());
    }
}
