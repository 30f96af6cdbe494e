//! Population samplers: the mutation/selection operators.

use std::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;

mod bga;
mod cmaes;
mod de;
mod pso;
mod random;

pub use bga::{BgaConfig, BiasedGeneticAlgorithm};
pub use cmaes::{CmaesConfig, CovarianceMatrixAdaptation};
pub use de::{DeConfig, DeStrategy, DifferentialEvolution};
pub use pso::{ParticleSwarm, PsoConfig};
pub use random::{RandomConfig, RandomSampler};

/// A stateful population operator.
///
/// A sampler owns its dimensionality, population size and RNG stream,
/// all fixed at construction. `initialize` resets any persistent
/// adaptive state and returns a fresh population; `iterate` produces
/// the next generation from the current population and its fitness
/// without mutating either input. Both always return exactly
/// `population_size` rows.
pub trait Sampler: Send {
    /// Key-vector dimensionality, fixed at construction.
    fn dimension(&self) -> usize;

    /// Number of individuals per generation.
    fn population_size(&self) -> usize;

    /// Whether an externally-sourced individual may be injected into
    /// this sampler's population without corrupting persistent
    /// adaptive state.
    fn accepts_immigrants(&self) -> bool {
        false
    }

    /// Resets all adaptive state and draws a fresh uniform population.
    fn initialize(&mut self) -> Array2<f64>;

    /// Resets all adaptive state and builds a population from up to
    /// `population_size` seed rows, filling the remainder uniformly.
    fn initialize_guided(&mut self, seeds: ArrayView2<'_, f64>) -> Array2<f64>;

    /// Produces the next generation.
    fn iterate(&mut self, population: ArrayView2<'_, f64>, fitness: ArrayView1<'_, f64>)
        -> Array2<f64>;

    /// Plain-data record of the complete sampler state, RNG stream
    /// included.
    fn snapshot(&self) -> SamplerSnapshot;
}

/// Serializable record of a sampler's complete state.
///
/// One variant per sampler kind; each holds the sampler's own
/// plain-data fields so a restored sampler continues bit-identically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SamplerSnapshot {
    /// Biased random-key genetic algorithm state.
    BiasedGeneticAlgorithm(BiasedGeneticAlgorithm),
    /// Differential evolution state.
    DifferentialEvolution(DifferentialEvolution),
    /// Particle swarm state.
    ParticleSwarm(ParticleSwarm),
    /// Random best-centered scatter state.
    Random(RandomSampler),
    /// CMA-ES state.
    CovarianceMatrixAdaptation(CovarianceMatrixAdaptation),
}

impl SamplerSnapshot {
    /// Rebuilds the live sampler from this record.
    pub fn restore(self) -> Box<dyn Sampler> {
        match self {
            SamplerSnapshot::BiasedGeneticAlgorithm(s) => Box::new(s),
            SamplerSnapshot::DifferentialEvolution(s) => Box::new(s),
            SamplerSnapshot::ParticleSwarm(s) => Box::new(s),
            SamplerSnapshot::Random(s) => Box::new(s),
            SamplerSnapshot::CovarianceMatrixAdaptation(s) => Box::new(s),
        }
    }
}

/// Closed set of sampler kinds with their typed parameters.
///
/// This is the construction surface for composing engines from
/// configuration: one variant per sampler kind, built through
/// [`SamplerConfig::build`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SamplerConfig {
    /// Biased random-key genetic algorithm.
    BiasedGeneticAlgorithm(BgaConfig),
    /// Differential evolution.
    DifferentialEvolution(DeConfig),
    /// Particle swarm optimization.
    ParticleSwarm(PsoConfig),
    /// Random best-centered scatter.
    Random(RandomConfig),
    /// Covariance matrix adaptation evolution strategy.
    CovarianceMatrixAdaptation(CmaesConfig),
}

impl SamplerConfig {
    /// Builds the sampler for `dimension`/`population` with an explicit
    /// RNG seed.
    pub fn build(self, dimension: usize, population: usize, seed: u64) -> Result<Box<dyn Sampler>> {
        Ok(match self {
            SamplerConfig::BiasedGeneticAlgorithm(config) => Box::new(
                BiasedGeneticAlgorithm::with_config(dimension, population, seed, config)?,
            ),
            SamplerConfig::DifferentialEvolution(config) => Box::new(
                DifferentialEvolution::with_config(dimension, population, seed, config)?,
            ),
            SamplerConfig::ParticleSwarm(config) => {
                Box::new(ParticleSwarm::with_config(dimension, population, seed, config)?)
            }
            SamplerConfig::Random(config) => {
                Box::new(RandomSampler::with_config(dimension, population, seed, config)?)
            }
            SamplerConfig::CovarianceMatrixAdaptation(config) => Box::new(
                CovarianceMatrixAdaptation::with_config(dimension, population, seed, config)?,
            ),
        })
    }
}

/// Fresh uniform population in `[0, 1)^d`.
pub(crate) fn uniform_population(rng: &mut ChaCha12Rng, p: usize, d: usize) -> Array2<f64> {
    Array2::from_shape_fn((p, d), |_| rng.random::<f64>())
}

/// Population seeded from the leading rows of `seeds`, rest uniform.
pub(crate) fn guided_population(
    rng: &mut ChaCha12Rng,
    p: usize,
    d: usize,
    seeds: ArrayView2<'_, f64>,
) -> Array2<f64> {
    let mut population = Array2::<f64>::zeros((p, d));
    let k = seeds.nrows().min(p);
    for i in 0..k {
        population.row_mut(i).assign(&seeds.row(i));
    }
    for i in k..p {
        for j in 0..d {
            population[[i, j]] = rng.random::<f64>();
        }
    }
    population
}

/// Indices of `fitness` sorted ascending (best first).
pub(crate) fn sorted_indices(fitness: ArrayView1<'_, f64>) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..fitness.len()).collect();
    indices.sort_by(|&a, &b| fitness[a].partial_cmp(&fitness[b]).unwrap_or(Ordering::Equal));
    indices
}

/// Index and value of the smallest fitness entry.
pub(crate) fn argmin(fitness: ArrayView1<'_, f64>) -> (usize, f64) {
    let mut best_index = 0;
    let mut best_value = fitness[0];
    for (i, &value) in fitness.iter().enumerate() {
        if value < best_value {
            best_value = value;
            best_index = i;
        }
    }
    (best_index, best_value)
}

/// Draws `count` indices from `0..pool`, distinct among themselves.
pub(crate) fn distinct_indices<R: Rng + ?Sized>(
    count: usize,
    pool: usize,
    rng: &mut R,
) -> Vec<usize> {
    debug_assert!(count <= pool);
    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let candidate = rng.random_range(0..pool);
        if !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }
    picked
}
