//! Differential evolution with a closed set of mutation strategies.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampler::{
    argmin, distinct_indices, guided_population, uniform_population, Sampler, SamplerSnapshot,
};

/// Mutation strategy: how the base and difference vectors of a mutant
/// are chosen. Parent indices are drawn distinct among themselves from
/// the whole population.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DeStrategy {
    /// DE/rand/1: `x_r0 + f * (x_r1 - x_r2)`.
    Rand1 {
        /// Difference weight.
        f: f64,
    },
    /// DE/best/1: `x_best + f * (x_r0 - x_r1)`.
    Best1 {
        /// Difference weight.
        f: f64,
    },
    /// DE/best/2: `x_best + f1 * (x_r0 - x_r1) + f2 * (x_r2 - x_r3)`.
    Best2 {
        /// First difference weight.
        f1: f64,
        /// Second difference weight.
        f2: f64,
    },
    /// DE/current-to-rand/1: `x_i + f1 * (x_r0 - x_r1) + f2 * (x_r2 - x_r3)`.
    CurrentToRand1 {
        /// First difference weight.
        f1: f64,
        /// Second difference weight.
        f2: f64,
    },
    /// DE/current-to-best/1: `x_i + f1 * (x_best - x_r1) + f2 * (x_r2 - x_r3)`.
    CurrentToBest1 {
        /// Weight toward the best individual.
        f1: f64,
        /// Second difference weight.
        f2: f64,
    },
}

impl Default for DeStrategy {
    fn default() -> Self {
        DeStrategy::Best1 { f: 0.7 }
    }
}

impl DeStrategy {
    /// Smallest population the strategy can draw parents from.
    fn minimum_population(self) -> usize {
        match self {
            DeStrategy::Rand1 { .. } | DeStrategy::Best1 { .. } => 4,
            DeStrategy::Best2 { .. }
            | DeStrategy::CurrentToRand1 { .. }
            | DeStrategy::CurrentToBest1 { .. } => 6,
        }
    }
}

/// Parameters for [`DifferentialEvolution`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeConfig {
    /// Crossover rate in `[0, 1]`.
    pub cr: f64,
    /// Mutation strategy.
    pub strategy: DeStrategy,
}

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            cr: 0.8,
            strategy: DeStrategy::default(),
        }
    }
}

/// Differential evolution sampler.
///
/// The public contract always returns exactly `population_size` rows:
/// the parent/trial pairing lives inside the sampler. Each `iterate`
/// call first selects, slot by slot, the better of the archived parent
/// and the incoming trial, then emits the next round of trials via
/// mutation and binomial crossover. The first call after
/// initialization adopts the incoming population as the parent set.
///
/// Accepts immigrants: an injected individual enters the selection
/// like any other trial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifferentialEvolution {
    d: usize,
    p: usize,
    cr: f64,
    strategy: DeStrategy,
    parents: Option<Array2<f64>>,
    parent_fitness: Array1<f64>,
    rng: ChaCha12Rng,
}

impl DifferentialEvolution {
    /// Creates a sampler with `cr = 0.8` and the `best/1` strategy.
    pub fn new(dimension: usize, population: usize, seed: u64) -> Result<Self> {
        Self::with_config(dimension, population, seed, DeConfig::default())
    }

    /// Creates a sampler with explicit parameters.
    pub fn with_config(
        dimension: usize,
        population: usize,
        seed: u64,
        config: DeConfig,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidDimensions { dimensions: dimension });
        }
        let minimum = config.strategy.minimum_population();
        if population < minimum {
            return Err(Error::PopulationTooSmall {
                population,
                minimum,
            });
        }
        if !(0.0..=1.0).contains(&config.cr) {
            return Err(Error::InvalidFraction {
                name: "cr",
                value: config.cr,
                range: "[0, 1]",
            });
        }
        Ok(Self {
            d: dimension,
            p: population,
            cr: config.cr,
            strategy: config.strategy,
            parents: None,
            parent_fitness: Array1::zeros(0),
            rng: ChaCha12Rng::seed_from_u64(seed),
        })
    }

    fn mutant(&mut self, current: usize, parents: &Array2<f64>, fitness: &Array1<f64>) -> Array1<f64> {
        let pool = self.p;
        match self.strategy {
            DeStrategy::Rand1 { f } => {
                let r = distinct_indices(3, pool, &mut self.rng);
                Zip::from(parents.row(r[0]))
                    .and(parents.row(r[1]))
                    .and(parents.row(r[2]))
                    .map_collect(|&x0, &x1, &x2| x0 + f * (x1 - x2))
            }
            DeStrategy::Best1 { f } => {
                let (best, _) = argmin(fitness.view());
                let r = distinct_indices(2, pool, &mut self.rng);
                Zip::from(parents.row(best))
                    .and(parents.row(r[0]))
                    .and(parents.row(r[1]))
                    .map_collect(|&b, &x0, &x1| b + f * (x0 - x1))
            }
            DeStrategy::Best2 { f1, f2 } => {
                let (best, _) = argmin(fitness.view());
                let r = distinct_indices(4, pool, &mut self.rng);
                Zip::from(parents.row(best))
                    .and(parents.row(r[0]))
                    .and(parents.row(r[1]))
                    .and(parents.row(r[2]))
                    .and(parents.row(r[3]))
                    .map_collect(|&b, &x0, &x1, &x2, &x3| b + f1 * (x0 - x1) + f2 * (x2 - x3))
            }
            DeStrategy::CurrentToRand1 { f1, f2 } => {
                let r = distinct_indices(4, pool, &mut self.rng);
                Zip::from(parents.row(current))
                    .and(parents.row(r[0]))
                    .and(parents.row(r[1]))
                    .and(parents.row(r[2]))
                    .and(parents.row(r[3]))
                    .map_collect(|&c, &x0, &x1, &x2, &x3| c + f1 * (x0 - x1) + f2 * (x2 - x3))
            }
            DeStrategy::CurrentToBest1 { f1, f2 } => {
                let (best, _) = argmin(fitness.view());
                let r = distinct_indices(4, pool, &mut self.rng);
                Zip::from(parents.row(current))
                    .and(parents.row(best))
                    .and(parents.row(r[1]))
                    .and(parents.row(r[2]))
                    .and(parents.row(r[3]))
                    .map_collect(|&c, &b, &x1, &x2, &x3| c + f1 * (b - x1) + f2 * (x2 - x3))
            }
        }
    }
}

/// Binomial crossover: each coordinate comes from the mutant with
/// probability `cr`; coordinate `j_rand` always does, so every trial
/// differs from its parent.
pub(crate) fn binomial_crossover<R: Rng + ?Sized>(
    parent: ArrayView1<'_, f64>,
    mutant: ArrayView1<'_, f64>,
    cr: f64,
    rng: &mut R,
) -> Array1<f64> {
    let d = parent.len();
    let j_rand = rng.random_range(0..d);
    let mut trial = parent.to_owned();
    for j in 0..d {
        if rng.random::<f64>() < cr || j == j_rand {
            trial[j] = mutant[j];
        }
    }
    trial
}

impl Sampler for DifferentialEvolution {
    fn dimension(&self) -> usize {
        self.d
    }

    fn population_size(&self) -> usize {
        self.p
    }

    fn accepts_immigrants(&self) -> bool {
        true
    }

    fn initialize(&mut self) -> Array2<f64> {
        self.parents = None;
        self.parent_fitness = Array1::zeros(0);
        uniform_population(&mut self.rng, self.p, self.d)
    }

    fn initialize_guided(&mut self, seeds: ArrayView2<'_, f64>) -> Array2<f64> {
        self.parents = None;
        self.parent_fitness = Array1::zeros(0);
        guided_population(&mut self.rng, self.p, self.d, seeds)
    }

    fn iterate(
        &mut self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
    ) -> Array2<f64> {
        // Selection: keep the better of (archived parent, incoming trial)
        // per slot. On the first call the incoming rows become parents.
        let (parents, parent_fitness) = match self.parents.take() {
            None => (population.to_owned(), fitness.to_owned()),
            Some(mut parents) => {
                let mut parent_fitness = std::mem::replace(&mut self.parent_fitness, Array1::zeros(0));
                for i in 0..self.p {
                    if fitness[i] < parent_fitness[i] {
                        parents.row_mut(i).assign(&population.row(i));
                        parent_fitness[i] = fitness[i];
                    }
                }
                (parents, parent_fitness)
            }
        };

        let mut trials = Array2::<f64>::zeros((self.p, self.d));
        for i in 0..self.p {
            let mutant = self.mutant(i, &parents, &parent_fitness);
            let trial = binomial_crossover(parents.row(i), mutant.view(), self.cr, &mut self.rng);
            trials.row_mut(i).assign(&trial);
        }

        self.parents = Some(parents);
        self.parent_fitness = parent_fitness;
        trials
    }

    fn snapshot(&self) -> SamplerSnapshot {
        SamplerSnapshot::DifferentialEvolution(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rejects_bad_configuration() {
        assert!(DifferentialEvolution::new(0, 10, 0).is_err());
        assert!(DifferentialEvolution::new(5, 3, 0).is_err());
        let best2 = DeConfig {
            strategy: DeStrategy::Best2 { f1: 0.5, f2: 0.5 },
            ..DeConfig::default()
        };
        assert!(DifferentialEvolution::with_config(5, 5, 0, best2).is_err());
        let bad_cr = DeConfig {
            cr: 1.5,
            ..DeConfig::default()
        };
        assert!(DifferentialEvolution::with_config(5, 10, 0, bad_cr).is_err());
    }

    #[test]
    fn iterate_returns_population_size() {
        for strategy in [
            DeStrategy::Rand1 { f: 0.7 },
            DeStrategy::Best1 { f: 0.7 },
            DeStrategy::Best2 { f1: 0.5, f2: 0.3 },
            DeStrategy::CurrentToRand1 { f1: 0.5, f2: 0.3 },
            DeStrategy::CurrentToBest1 { f1: 0.5, f2: 0.3 },
        ] {
            let config = DeConfig {
                strategy,
                ..DeConfig::default()
            };
            let mut sampler = DifferentialEvolution::with_config(4, 8, 0, config).unwrap();
            let population = sampler.initialize();
            let fitness = Array1::from_iter((0..8).map(|i| i as f64));
            let next = sampler.iterate(population.view(), fitness.view());
            assert_eq!(next.shape(), &[8, 4]);
            let again = sampler.iterate(next.view(), fitness.view());
            assert_eq!(again.shape(), &[8, 4]);
        }
    }

    #[test]
    fn full_crossover_copies_the_mutant() {
        let parent = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let mutant = array![10.0, 20.0, 30.0, 40.0, 50.0];
        let mut rng = ChaCha12Rng::seed_from_u64(42);
        let trial = binomial_crossover(parent.view(), mutant.view(), 1.0, &mut rng);
        assert_eq!(trial, mutant);
    }

    #[test]
    fn zero_crossover_changes_exactly_one_coordinate() {
        let parent = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let mutant = array![10.0, 20.0, 30.0, 40.0, 50.0];
        for seed in 0..20 {
            let mut rng = ChaCha12Rng::seed_from_u64(seed);
            let trial = binomial_crossover(parent.view(), mutant.view(), 0.0, &mut rng);
            let changed = trial
                .iter()
                .zip(parent.iter())
                .filter(|(t, p)| t != p)
                .count();
            assert_eq!(changed, 1, "seed {seed}");
        }
    }

    #[test]
    fn selection_keeps_better_parent() {
        let mut sampler = DifferentialEvolution::new(2, 4, 0).unwrap();
        let parents = array![[0.1, 0.1], [0.2, 0.2], [0.3, 0.3], [0.4, 0.4]];
        let parent_fitness = array![1.0, 2.0, 3.0, 4.0];
        // First call archives the parents.
        let _ = sampler.iterate(parents.view(), parent_fitness.view());
        // Worse trials everywhere: the archive must be unchanged.
        let trials = array![[0.9, 0.9], [0.9, 0.9], [0.9, 0.9], [0.9, 0.9]];
        let trial_fitness = array![9.0, 9.0, 9.0, 9.0];
        let _ = sampler.iterate(trials.view(), trial_fitness.view());
        assert_eq!(sampler.parents.as_ref().unwrap(), &parents);
        // Better trial in slot 2 replaces that parent only.
        let trial_fitness = array![9.0, 9.0, 0.5, 9.0];
        let _ = sampler.iterate(trials.view(), trial_fitness.view());
        let archived = sampler.parents.as_ref().unwrap();
        assert_eq!(archived.row(0), parents.row(0));
        assert_eq!(archived.row(2), trials.row(2));
        assert_eq!(sampler.parent_fitness[2], 0.5);
    }

    #[test]
    fn identical_seeds_are_bit_identical() {
        let mut a = DifferentialEvolution::new(6, 10, 3).unwrap();
        let mut b = DifferentialEvolution::new(6, 10, 3).unwrap();
        let mut pop_a = a.initialize();
        let mut pop_b = b.initialize();
        let fitness = Array1::from_iter((0..10).map(|i| (10 - i) as f64));
        for _ in 0..5 {
            assert_eq!(pop_a, pop_b);
            pop_a = a.iterate(pop_a.view(), fitness.view());
            pop_b = b.iterate(pop_b.view(), fitness.view());
        }
    }
}
