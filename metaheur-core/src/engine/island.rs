//! Island model: independent sub-engines with periodic migration.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ndarray::ArrayView1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use crate::engine::default::DefaultEngine;
use crate::engine::{Engine, EngineCore, EvalConfig};
use crate::error::{Error, Result};
use crate::monitor::{Monitor, StoppingMonitor};
use crate::problem::Problem;
use crate::sampler::Sampler;
use crate::snapshot::EngineState;

/// Composes independent sub-engines over one shared problem and
/// migrates best solutions between them at a fixed interval.
///
/// Every `migration_interval` top-level iterations one origin and one
/// destination island are drawn uniformly at random and the origin's
/// best solution is offered to the destination. The destination admits
/// it only when its sampler accepts immigrants, and then into a
/// uniformly-random slot; randomized replacement keeps more diversity
/// than evicting the worst individual.
pub struct IslandEngine<P: Problem> {
    core: EngineCore<P>,
    islands: Vec<Box<dyn Engine<P>>>,
    monitor: Box<dyn Monitor>,
    migration_interval: u64,
    rng: ChaCha12Rng,
}

impl<P: Problem + 'static> IslandEngine<P> {
    /// Creates an island engine from pre-built sub-engines.
    pub fn new(
        name: impl Into<String>,
        problem: Arc<P>,
        islands: Vec<Box<dyn Engine<P>>>,
        monitor: Box<dyn Monitor>,
        migration_interval: u64,
        seed: u64,
    ) -> Result<Self> {
        if islands.is_empty() {
            return Err(Error::EmptyComposition { what: "island" });
        }
        if migration_interval == 0 {
            return Err(Error::InvalidInterval {
                name: "migration interval",
            });
        }
        for island in &islands {
            if island.problem().dimension() != problem.dimension() {
                return Err(Error::DimensionMismatch {
                    expected: problem.dimension(),
                    got: island.problem().dimension(),
                });
            }
        }
        Ok(Self {
            core: EngineCore::new(name.into(), problem, EvalConfig::default()),
            islands,
            monitor,
            migration_interval,
            rng: ChaCha12Rng::seed_from_u64(seed),
        })
    }

    /// Builds one default-engine island per sampler, named
    /// `island-0..n` and seeded `seed, seed+1, ...`. Island monitors
    /// are silent; the island engine's own monitor controls the run.
    pub fn islands_of(
        problem: &Arc<P>,
        samplers: Vec<Box<dyn Sampler>>,
        seed: u64,
    ) -> Result<Vec<Box<dyn Engine<P>>>> {
        if samplers.is_empty() {
            return Err(Error::EmptyComposition { what: "sampler" });
        }
        samplers
            .into_iter()
            .enumerate()
            .map(|(index, sampler)| {
                island_of(
                    format!("island-{index}"),
                    problem.clone(),
                    sampler,
                    seed.wrapping_add(index as u64),
                )
            })
            .collect()
    }

    /// Number of islands.
    pub fn island_count(&self) -> usize {
        self.islands.len()
    }

    /// Read access to one island, for inspection and tests.
    pub fn island(&self, index: usize) -> &dyn Engine<P> {
        self.islands[index].as_ref()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restore_parts(
        name: String,
        problem: Arc<P>,
        islands: Vec<Box<dyn Engine<P>>>,
        monitor: Box<dyn Monitor>,
        migration_interval: u64,
        rng: ChaCha12Rng,
        best_solution: Vec<f64>,
        best_fitness: f64,
        iterations: u64,
        evaluations: u64,
    ) -> Self {
        let mut core = EngineCore::new(name, problem, EvalConfig::default());
        core.best_solution = ndarray::Array1::from_vec(best_solution);
        core.best_fitness = best_fitness;
        core.iterations = iterations;
        core.evaluations = evaluations;
        Self {
            core,
            islands,
            monitor,
            migration_interval,
            rng,
        }
    }

    /// Attempts one migration between a uniformly-random origin and
    /// destination island; a coinciding pair is a no-op.
    pub fn migrate(&mut self) -> Result<()> {
        if self.islands.len() < 2 {
            return Ok(());
        }
        let origin = self.rng.random_range(0..self.islands.len());
        let destination = self.rng.random_range(0..self.islands.len());
        if origin == destination {
            return Ok(());
        }
        let (solution, fitness) = {
            let island = &self.islands[origin];
            (island.best_solution().to_owned(), island.best_fitness())
        };
        if solution.is_empty() {
            return Ok(());
        }
        let admitted = self.islands[destination].arrival(solution.view(), fitness);
        self.monitor.log(
            log::Level::Debug,
            &self.core.name,
            &format!(
                "migration [{origin}] -> [{destination}] fitness [{fitness:.6e}] admitted [{admitted}]"
            ),
        );
        Ok(())
    }
}

impl<P: Problem + 'static> Engine<P> for IslandEngine<P> {
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
        for island in &mut self.islands {
            island.update_fitness()?;
        }
        self.core.evaluations = self.islands.iter().map(|i| i.evaluations()).sum();

        // Global best is the min over island bests, updated atomically.
        let mut best_index = 0;
        for index in 1..self.islands.len() {
            if self.islands[index].best_fitness() < self.islands[best_index].best_fitness() {
                best_index = index;
            }
        }
        let island_best = self.islands[best_index].best_fitness();
        if island_best < self.core.best_fitness || self.core.best_fitness == f64::MAX {
            self.core.best_fitness = island_best;
            self.core.best_solution = self.islands[best_index].best_solution().to_owned();
        }
        Ok(())
    }

    fn next_iteration(&mut self) -> Result<()> {
        self.core.iterations += 1;
        if self.core.iterations % self.migration_interval == 0 {
            self.migrate()?;
        }
        for island in &mut self.islands {
            island.next_iteration()?;
        }
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
        let open: Vec<usize> = self
            .islands
            .iter()
            .enumerate()
            .filter(|(_, island)| island.accepts_immigrants())
            .map(|(index, _)| index)
            .collect();
        if open.is_empty() {
            return false;
        }
        let destination = open[self.rng.random_range(0..open.len())];
        self.islands[destination].arrival(solution, fitness)
    }

    fn accepts_immigrants(&self) -> bool {
        self.islands.iter().any(|island| island.accepts_immigrants())
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
        EngineState::Island {
            name: self.core.name.clone(),
            best_solution: self.core.best_solution.to_vec(),
            best_fitness: self.core.best_fitness,
            iterations: self.core.iterations,
            evaluations: self.core.evaluations,
            migration_interval: self.migration_interval,
            rng: self.rng.clone(),
            islands: self.islands.iter().map(|i| i.state_snapshot()).collect(),
        }
    }
}

/// Builds a default-engine island with a silent monitor.
pub fn island_of<P: Problem + 'static>(
    name: impl Into<String>,
    problem: Arc<P>,
    sampler: Box<dyn Sampler>,
    seed: u64,
) -> Result<Box<dyn Engine<P>>> {
    Ok(Box::new(DefaultEngine::new(
        name,
        problem,
        sampler,
        Box::new(StoppingMonitor::new()),
        seed,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Goal;
    use crate::sampler::{BiasedGeneticAlgorithm, CovarianceMatrixAdaptation, DifferentialEvolution};
    use ndarray::array;

    struct KeySphere;

    impl Problem for KeySphere {
        type Solution = Vec<f64>;
        fn dimension(&self) -> usize {
            3
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

    fn two_open_islands(problem: &Arc<KeySphere>) -> Vec<Box<dyn Engine<KeySphere>>> {
        vec![
            island_of(
                "island-0",
                problem.clone(),
                Box::new(BiasedGeneticAlgorithm::new(3, 10, 0).unwrap()),
                0,
            )
            .unwrap(),
            island_of(
                "island-1",
                problem.clone(),
                Box::new(DifferentialEvolution::new(3, 10, 1).unwrap()),
                1,
            )
            .unwrap(),
        ]
    }

    #[test]
    fn rejects_bad_composition() {
        let problem = Arc::new(KeySphere);
        let monitor = Box::new(StoppingMonitor::new());
        assert!(matches!(
            IslandEngine::new("i", problem.clone(), vec![], monitor, 1, 0),
            Err(Error::EmptyComposition { .. })
        ));
        let monitor = Box::new(StoppingMonitor::new());
        let islands = two_open_islands(&problem);
        assert!(matches!(
            IslandEngine::new("i", problem, islands, monitor, 0, 0),
            Err(Error::InvalidInterval { .. })
        ));
    }

    #[test]
    fn global_best_is_min_over_islands() {
        let problem = Arc::new(KeySphere);
        let islands = two_open_islands(&problem);
        let monitor = Box::new(StoppingMonitor::new().max_iterations(20));
        let mut engine =
            IslandEngine::new("islands", problem, islands, monitor, 5, 0).unwrap();
        engine.optimize().unwrap();
        let island_best = (0..engine.island_count())
            .map(|i| engine.island(i).best_fitness())
            .fold(f64::MAX, f64::min);
        assert_eq!(engine.best_fitness(), island_best);
        let total: u64 = (0..engine.island_count())
            .map(|i| engine.island(i).evaluations())
            .sum();
        assert_eq!(engine.evaluations(), total);
    }

    #[test]
    fn migration_plants_best_into_open_destination() {
        let problem = Arc::new(KeySphere);
        let islands = two_open_islands(&problem);
        let monitor = Box::new(StoppingMonitor::new());
        let mut engine =
            IslandEngine::new("islands", problem, islands, monitor, 1, 42).unwrap();
        engine.begin();
        engine.update_fitness().unwrap();
        let best_a = engine.island(0).best_solution().to_owned();
        let best_b = engine.island(1).best_solution().to_owned();

        // Repeated attempts guarantee at least one non-coinciding pair;
        // both islands are open, so that migrant must be admitted.
        for _ in 0..20 {
            engine.migrate().unwrap();
        }

        let EngineState::Island { islands, .. } = engine.state_snapshot() else {
            panic!("island engine must snapshot as an island state");
        };
        let populations: Vec<_> = islands
            .into_iter()
            .map(|state| match state {
                EngineState::Default(inner) => inner.population,
                _ => panic!("sub-engines are default engines"),
            })
            .collect();
        let contains = |population: &ndarray::Array2<f64>, row: &ndarray::Array1<f64>| {
            (0..population.nrows()).any(|i| population.row(i) == row.view())
        };
        assert!(
            contains(&populations[1], &best_a) || contains(&populations[0], &best_b),
            "some island must hold a migrant from its peer"
        );
    }

    #[test]
    fn arrival_respects_open_borders() {
        let problem = Arc::new(KeySphere);
        let open = island_of(
            "open",
            problem.clone(),
            Box::new(BiasedGeneticAlgorithm::new(3, 10, 0).unwrap()),
            0,
        )
        .unwrap();
        let closed = island_of(
            "closed",
            problem.clone(),
            Box::new(CovarianceMatrixAdaptation::new(3, 10, 0).unwrap()),
            1,
        )
        .unwrap();
        let monitor = Box::new(StoppingMonitor::new());
        let mut engine =
            IslandEngine::new("islands", problem, vec![open, closed], monitor, 1, 0).unwrap();
        engine.update_fitness().unwrap();
        assert!(engine.accepts_immigrants());
        let migrant = array![0.5, 0.5, 0.5];
        // Only the open island can admit, so forwarding must succeed.
        assert!(engine.arrival(migrant.view(), 0.0));
    }

    #[test]
    fn closed_islands_reject_arrivals() {
        let problem = Arc::new(KeySphere);
        let closed = island_of(
            "closed",
            problem.clone(),
            Box::new(CovarianceMatrixAdaptation::new(3, 10, 0).unwrap()),
            0,
        )
        .unwrap();
        let monitor = Box::new(StoppingMonitor::new());
        let mut engine =
            IslandEngine::new("islands", problem, vec![closed], monitor, 1, 0).unwrap();
        engine.update_fitness().unwrap();
        assert!(!engine.accepts_immigrants());
        let migrant = array![0.5, 0.5, 0.5];
        assert!(!engine.arrival(migrant.view(), 0.0));
    }
}
