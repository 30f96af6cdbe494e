//! The plain evaluate/sample loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::engine::{Engine, EngineCore, EvalConfig};
use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::problem::Problem;
use crate::sampler::Sampler;
use crate::snapshot::{DefaultEngineState, EngineState};

/// Basic optimization engine: evaluate the population, update the best,
/// poll the monitor, sample the next generation.
pub struct DefaultEngine<P: Problem> {
    pub(crate) core: EngineCore<P>,
    pub(crate) sampler: Box<dyn Sampler>,
    pub(crate) monitor: Box<dyn Monitor>,
    pub(crate) population: Array2<f64>,
    pub(crate) fitness: Array1<f64>,
    pub(crate) rng: ChaCha12Rng,
}

impl<P: Problem> DefaultEngine<P> {
    /// Creates an engine around one sampler. The sampler draws its
    /// initial population immediately.
    pub fn new(
        name: impl Into<String>,
        problem: Arc<P>,
        sampler: Box<dyn Sampler>,
        monitor: Box<dyn Monitor>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_eval(name, problem, sampler, monitor, seed, EvalConfig::default())
    }

    /// Creates an engine with an explicit evaluation configuration.
    pub fn with_eval(
        name: impl Into<String>,
        problem: Arc<P>,
        mut sampler: Box<dyn Sampler>,
        monitor: Box<dyn Monitor>,
        seed: u64,
        eval: EvalConfig,
    ) -> Result<Self> {
        if problem.dimension() != sampler.dimension() {
            return Err(Error::DimensionMismatch {
                expected: problem.dimension(),
                got: sampler.dimension(),
            });
        }
        let population = sampler.initialize();
        let fitness = Array1::from_elem(population.nrows(), f64::MAX);
        Ok(Self {
            core: EngineCore::new(name.into(), problem, eval),
            sampler,
            monitor,
            population,
            fitness,
            rng: ChaCha12Rng::seed_from_u64(seed),
        })
    }

    /// Current population, for inspection and tests.
    pub fn population(&self) -> ArrayView2<'_, f64> {
        self.population.view()
    }

    /// Fitness of the current population.
    pub fn fitness(&self) -> ArrayView1<'_, f64> {
        self.fitness.view()
    }

    /// Population size of the underlying sampler.
    pub(crate) fn sampler_population(&self) -> usize {
        self.sampler.population_size()
    }

    /// Swaps the active sampler for another, returning the old one.
    pub(crate) fn replace_sampler(&mut self, sampler: Box<dyn Sampler>) -> Box<dyn Sampler> {
        std::mem::replace(&mut self.sampler, sampler)
    }

    /// Re-initializes the population from seed rows via the sampler's
    /// guided initialization; callers re-evaluate afterwards.
    pub(crate) fn reseed_guided(&mut self, seeds: ArrayView2<'_, f64>) {
        self.population = self.sampler.initialize_guided(seeds);
        self.fitness = Array1::from_elem(self.population.nrows(), f64::MAX);
    }

    pub(crate) fn restore_parts(
        state: DefaultEngineState,
        problem: Arc<P>,
        monitor: Box<dyn Monitor>,
    ) -> Result<Self> {
        let sampler = state.sampler.restore();
        if problem.dimension() != sampler.dimension() {
            return Err(Error::DimensionMismatch {
                expected: problem.dimension(),
                got: sampler.dimension(),
            });
        }
        let mut core = EngineCore::new(state.name, problem, state.eval);
        core.best_solution = Array1::from_vec(state.best_solution);
        core.best_fitness = state.best_fitness;
        core.iterations = state.iterations;
        core.evaluations = state.evaluations;
        Ok(Self {
            core,
            sampler,
            monitor,
            population: state.population,
            fitness: state.fitness,
            rng: state.rng,
        })
    }

    pub(crate) fn state_parts(&self) -> DefaultEngineState {
        DefaultEngineState {
            name: self.core.name.clone(),
            population: self.population.clone(),
            fitness: self.fitness.clone(),
            best_solution: self.core.best_solution.to_vec(),
            best_fitness: self.core.best_fitness,
            iterations: self.core.iterations,
            evaluations: self.core.evaluations,
            eval: self.core.eval,
            rng: self.rng.clone(),
            sampler: self.sampler.snapshot(),
        }
    }
}

impl<P: Problem> Engine<P> for DefaultEngine<P> {
    fn name(&self) -> &str {
        &self.core.name
    }

    fn problem(&self) -> &Arc<P> {
        &self.core.problem
    }

    fn best_fitness(&self) -> f64 {
        self.core.best_fitness
    }

    fn best_solution(&self) -> ArrayView1<'_, f64> {
        self.core.best_solution.view()
    }

    fn iterations(&self) -> u64 {
        self.core.iterations
    }

    fn evaluations(&self) -> u64 {
        self.core.evaluations
    }

    fn elapsed(&self) -> Duration {
        self.core.elapsed()
    }

    fn update_fitness(&mut self) -> Result<()> {
        self.fitness = self.core.evaluate(&self.population)?;
        self.core.absorb_best(&self.population, &self.fitness);
        Ok(())
    }

    fn next_iteration(&mut self) -> Result<()> {
        self.core.iterations += 1;
        self.population = self
            .sampler
            .iterate(self.population.view(), self.fitness.view());
        self.monitor.log(
            log::Level::Debug,
            &self.core.name,
            &format!(
                "iteration [{}] finished, best fitness [{:.6e}]",
                self.core.iterations, self.core.best_fitness
            ),
        );
        Ok(())
    }

    fn arrival(&mut self, solution: ArrayView1<'_, f64>, fitness: f64) -> bool {
        let target = self.rng.random_range(0..self.population.nrows());
        if !self.sampler.accepts_immigrants() {
            self.monitor.log(
                log::Level::Debug,
                &self.core.name,
                "immigrant arrived but the border is closed",
            );
            return false;
        }
        // A random slot, not the worst one: keeps diversity.
        self.population.row_mut(target).assign(&solution);
        self.fitness[target] = fitness;
        self.monitor.log(
            log::Level::Debug,
            &self.core.name,
            &format!("immigrant [{fitness:.6e}] admitted at slot [{target}]"),
        );
        true
    }

    fn accepts_immigrants(&self) -> bool {
        self.sampler.accepts_immigrants()
    }

    fn begin(&mut self) {
        self.core.started = Some(Instant::now());
        self.monitor
            .log(log::Level::Info, &self.core.name, "engine started");
    }

    fn should_stop(&mut self) -> bool {
        let stop = self.monitor.stop(&self.core.view());
        if stop {
            self.monitor.log(
                log::Level::Info,
                &self.core.name,
                &format!(
                    "engine terminated with best fitness [{:.6e}] after [{}] iterations",
                    self.core.best_fitness, self.core.iterations
                ),
            );
        }
        stop
    }

    fn state_snapshot(&self) -> EngineState {
        EngineState::Default(self.state_parts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::StoppingMonitor;
    use crate::problem::Goal;
    use crate::sampler::{BiasedGeneticAlgorithm, CovarianceMatrixAdaptation};
    use ndarray::array;

    struct KeySphere {
        d: usize,
    }

    impl Problem for KeySphere {
        type Solution = Vec<f64>;
        fn dimension(&self) -> usize {
            self.d
        }
        fn goal(&self) -> Goal {
            Goal::Minimize
        }
        fn decode(&self, keys: ArrayView1<'_, f64>) -> Vec<f64> {
            keys.iter().map(|&k| k - 0.5).collect()
        }
        fn objective(&self, x: &Vec<f64>) -> f64 {
            x.iter().map(|v| v * v).sum()
        }
    }

    fn engine(seed: u64, iterations: u64) -> DefaultEngine<KeySphere> {
        let sampler = Box::new(BiasedGeneticAlgorithm::new(4, 20, seed).unwrap());
        let monitor = Box::new(StoppingMonitor::new().max_iterations(iterations));
        DefaultEngine::new("test", Arc::new(KeySphere { d: 4 }), sampler, monitor, seed).unwrap()
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let sampler = Box::new(BiasedGeneticAlgorithm::new(3, 20, 0).unwrap());
        let monitor = Box::new(StoppingMonitor::new());
        let result = DefaultEngine::new("bad", Arc::new(KeySphere { d: 4 }), sampler, monitor, 0);
        assert!(matches!(result, Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn optimize_improves_and_counts() {
        let mut engine = engine(0, 50);
        let best = engine.optimize().unwrap();
        assert_eq!(best.len(), 4);
        assert_eq!(engine.iterations(), 50);
        // 51 evaluation rounds of 20 individuals: initial + one per iteration.
        assert_eq!(engine.evaluations(), 51 * 20);
        assert!(engine.best_fitness() < 1.0);
    }

    #[test]
    fn best_fitness_is_monotone() {
        let mut engine = engine(1, 0);
        engine.begin();
        let mut last = f64::MAX;
        for _ in 0..30 {
            engine.update_fitness().unwrap();
            assert!(engine.best_fitness() <= last);
            last = engine.best_fitness();
            engine.next_iteration().unwrap();
        }
    }

    #[test]
    fn arrival_admitted_into_open_sampler() {
        let mut engine = engine(2, 10);
        engine.update_fitness().unwrap();
        let migrant = array![0.5, 0.5, 0.5, 0.5];
        assert!(engine.arrival(migrant.view(), 0.0));
        let found = (0..engine.population().nrows())
            .any(|i| engine.population().row(i) == migrant.view());
        assert!(found, "migrant must occupy some population slot");
        assert!(engine.fitness().iter().any(|&f| f == 0.0));
    }

    #[test]
    fn arrival_rejected_by_closed_sampler() {
        let sampler = Box::new(CovarianceMatrixAdaptation::new(4, 10, 0).unwrap());
        let monitor = Box::new(StoppingMonitor::new());
        let mut engine =
            DefaultEngine::new("closed", Arc::new(KeySphere { d: 4 }), sampler, monitor, 0)
                .unwrap();
        engine.update_fitness().unwrap();
        let before = engine.population().to_owned();
        let migrant = array![0.5, 0.5, 0.5, 0.5];
        assert!(!engine.arrival(migrant.view(), 0.0));
        assert_eq!(engine.population(), before.view());
    }

    #[test]
    fn identical_seeds_run_identically() {
        let mut a = engine(7, 40);
        let mut b = engine(7, 40);
        a.optimize().unwrap();
        b.optimize().unwrap();
        assert_eq!(a.best_fitness(), b.best_fitness());
        assert_eq!(a.best_solution(), b.best_solution());
    }
}
