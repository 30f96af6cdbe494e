//! Best-centered Gaussian scatter sampler.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::standard_normal;
use crate::sampler::{argmin, guided_population, uniform_population, Sampler, SamplerSnapshot};

/// Parameters for [`RandomSampler`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RandomConfig {
    /// Standard deviation of the scatter around the incumbent best.
    pub sigma: f64,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self { sigma: 1e-10 }
    }
}

/// Keeps the incumbent best in slot 0 and scatters the rest of the
/// population as Gaussian perturbations of it.
///
/// A cheap local-exploitation operator, mostly useful as a member of an
/// alternation pool. Accepts immigrants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomSampler {
    d: usize,
    p: usize,
    sigma: f64,
    rng: ChaCha12Rng,
}

impl RandomSampler {
    /// Creates a sampler with a near-zero default scatter scale.
    pub fn new(dimension: usize, population: usize, seed: u64) -> Result<Self> {
        Self::with_config(dimension, population, seed, RandomConfig::default())
    }

    /// Creates a sampler with an explicit scatter scale.
    pub fn with_config(
        dimension: usize,
        population: usize,
        seed: u64,
        config: RandomConfig,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidDimensions { dimensions: dimension });
        }
        if population == 0 {
            return Err(Error::PopulationTooSmall {
                population,
                minimum: 1,
            });
        }
        if !(config.sigma > 0.0 && config.sigma.is_finite()) {
            return Err(Error::InvalidFraction {
                name: "sigma",
                value: config.sigma,
                range: "(0, inf)",
            });
        }
        Ok(Self {
            d: dimension,
            p: population,
            sigma: config.sigma,
            rng: ChaCha12Rng::seed_from_u64(seed),
        })
    }
}

impl Sampler for RandomSampler {
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
        let (best, _) = argmin(fitness);
        let mut next = Array2::<f64>::zeros((self.p, self.d));
        next.row_mut(0).assign(&population.row(best));
        for i in 1..self.p {
            for j in 0..self.d {
                next[[i, j]] = population[[best, j]] + self.sigma * standard_normal(&mut self.rng);
            }
        }
        next
    }

    fn snapshot(&self) -> SamplerSnapshot {
        SamplerSnapshot::Random(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn keeps_best_in_first_slot() {
        let mut sampler = RandomSampler::new(2, 4, 0).unwrap();
        let population = array![[0.1, 0.1], [0.5, 0.5], [0.9, 0.9], [0.3, 0.3]];
        let fitness = array![4.0, 1.0, 2.0, 3.0];
        let next = sampler.iterate(population.view(), fitness.view());
        assert_eq!(next.row(0), population.row(1));
    }

    #[test]
    fn scatter_stays_near_best_for_tiny_sigma() {
        let config = RandomConfig { sigma: 1e-9 };
        let mut sampler = RandomSampler::with_config(3, 5, 0, config).unwrap();
        let population = sampler.initialize();
        let fitness = Array1::from_iter((0..5).map(|i| i as f64));
        let next = sampler.iterate(population.view(), fitness.view());
        for i in 1..5 {
            for j in 0..3 {
                assert!((next[[i, j]] - population[[0, j]]).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn rejects_nonpositive_sigma() {
        let config = RandomConfig { sigma: 0.0 };
        assert!(RandomSampler::with_config(2, 3, 0, config).is_err());
    }
}
