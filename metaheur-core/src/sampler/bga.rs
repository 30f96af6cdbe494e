//! Biased random-key genetic algorithm.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampler::{
    guided_population, sorted_indices, uniform_population, Sampler, SamplerSnapshot,
};

/// Parameters for [`BiasedGeneticAlgorithm`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BgaConfig {
    /// Probability of inheriting a coordinate from the elite parent.
    pub bias: f64,
    /// Fraction of the population carried over unchanged, best first.
    pub elites: f64,
    /// Fraction of the population regenerated as fresh random vectors.
    pub mutants: f64,
}

impl Default for BgaConfig {
    fn default() -> Self {
        Self {
            bias: 0.70,
            elites: 0.25,
            mutants: 0.20,
        }
    }
}

/// Genetic algorithm following the biased random-key design: elites
/// survive unchanged, mutants re-explore, and the remainder is produced
/// by biased crossover between an elite and a non-elite parent.
///
/// Accepts immigrants: it keeps no adaptive state beyond the RNG
/// stream, so an injected individual simply competes on fitness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasedGeneticAlgorithm {
    d: usize,
    p: usize,
    bias: f64,
    n_elites: usize,
    n_mutants: usize,
    rng: ChaCha12Rng,
}

impl BiasedGeneticAlgorithm {
    /// Creates a sampler with the default bias/elites/mutants split.
    pub fn new(dimension: usize, population: usize, seed: u64) -> Result<Self> {
        Self::with_config(dimension, population, seed, BgaConfig::default())
    }

    /// Creates a sampler with explicit parameters.
    pub fn with_config(
        dimension: usize,
        population: usize,
        seed: u64,
        config: BgaConfig,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidDimensions { dimensions: dimension });
        }
        if population <= 4 {
            return Err(Error::PopulationTooSmall {
                population,
                minimum: 5,
            });
        }
        if !(0.0..=1.0).contains(&config.bias) {
            return Err(Error::InvalidFraction {
                name: "bias",
                value: config.bias,
                range: "[0, 1]",
            });
        }
        let n_elites = (population as f64 * config.elites).round() as usize;
        let n_mutants = (population as f64 * config.mutants).round() as usize;
        if n_elites == 0 {
            return Err(Error::InvalidFraction {
                name: "elites",
                value: config.elites,
                range: "(0, 1), at least one elite",
            });
        }
        if n_mutants == 0 {
            return Err(Error::InvalidFraction {
                name: "mutants",
                value: config.mutants,
                range: "(0, 1), at least one mutant",
            });
        }
        if n_elites + n_mutants >= population {
            return Err(Error::ElitesPlusMutants {
                elites: n_elites,
                mutants: n_mutants,
                population,
            });
        }
        Ok(Self {
            d: dimension,
            p: population,
            bias: config.bias,
            n_elites,
            n_mutants,
            rng: ChaCha12Rng::seed_from_u64(seed),
        })
    }
}

impl Sampler for BiasedGeneticAlgorithm {
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
        uniform_population(&mut self.rng, self.p, self.d)
    }

    fn initialize_guided(&mut self, seeds: ArrayView2<'_, f64>) -> Array2<f64> {
        guided_population(&mut self.rng, self.p, self.d, seeds)
    }

    fn iterate(
        &mut self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
    ) -> Array2<f64> {
        let ranked = sorted_indices(fitness);
        let mut next = Array2::<f64>::zeros((self.p, self.d));

        // Elites survive unchanged, best first.
        for i in 0..self.n_elites {
            next.row_mut(i).assign(&population.row(ranked[i]));
        }

        // Mutants re-explore uniformly.
        for i in 0..self.n_mutants {
            for j in 0..self.d {
                next[[self.n_elites + i, j]] = self.rng.random::<f64>();
            }
        }

        // Biased crossover fills the remainder.
        for s in (self.n_elites + self.n_mutants)..self.p {
            let elite = ranked[self.rng.random_range(0..self.n_elites)];
            let other = self.rng.random_range(self.n_elites..self.p);
            for j in 0..self.d {
                next[[s, j]] = if self.rng.random::<f64>() < self.bias {
                    population[[elite, j]]
                } else {
                    population[[other, j]]
                };
            }
        }
        next
    }

    fn snapshot(&self) -> SamplerSnapshot {
        SamplerSnapshot::BiasedGeneticAlgorithm(self.clone())
    }
}
