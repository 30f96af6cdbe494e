//! Particle swarm optimization.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sampler::{guided_population, uniform_population, Sampler, SamplerSnapshot};

/// Parameters for [`ParticleSwarm`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PsoConfig {
    /// Inertia weight applied to the previous velocity.
    pub w: f64,
    /// Cognitive acceleration toward the personal best.
    pub c1: f64,
    /// Social acceleration toward the global best.
    pub c2: f64,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            w: 0.5,
            c1: 2.0,
            c2: 2.0,
        }
    }
}

/// Particle swarm sampler.
///
/// Keeps per-particle best positions and velocities plus a single
/// global best across the sampler's lifetime; all are reset by
/// `initialize`. Positions are not clamped here: overshoot past
/// `[0, 1)` is scored as worst fitness by the engine, which pulls
/// escaped particles back through the personal/global best terms.
///
/// Accepts immigrants: an injected individual competes through the
/// usual best-tracking on the next iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleSwarm {
    d: usize,
    p: usize,
    w: f64,
    c1: f64,
    c2: f64,
    pbest: Array2<f64>,
    pbest_fitness: Array1<f64>,
    gbest: Array1<f64>,
    gbest_fitness: f64,
    velocities: Array2<f64>,
    rng: ChaCha12Rng,
}

impl ParticleSwarm {
    /// Creates a sampler with the conventional `w=0.5, c1=c2=2.0`.
    pub fn new(dimension: usize, population: usize, seed: u64) -> Result<Self> {
        Self::with_config(dimension, population, seed, PsoConfig::default())
    }

    /// Creates a sampler with explicit parameters.
    pub fn with_config(
        dimension: usize,
        population: usize,
        seed: u64,
        config: PsoConfig,
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
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let velocities = uniform_population(&mut rng, population, dimension);
        Ok(Self {
            d: dimension,
            p: population,
            w: config.w,
            c1: config.c1,
            c2: config.c2,
            pbest: Array2::zeros((population, dimension)),
            pbest_fitness: Array1::from_elem(population, f64::MAX),
            gbest: Array1::zeros(dimension),
            gbest_fitness: f64::MAX,
            velocities,
            rng,
        })
    }

    fn reset_history(&mut self) {
        self.pbest = Array2::zeros((self.p, self.d));
        self.pbest_fitness = Array1::from_elem(self.p, f64::MAX);
        self.gbest = Array1::zeros(self.d);
        self.gbest_fitness = f64::MAX;
        self.velocities = uniform_population(&mut self.rng, self.p, self.d);
    }
}

impl Sampler for ParticleSwarm {
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
        let population = uniform_population(&mut self.rng, self.p, self.d);
        self.reset_history();
        population
    }

    fn initialize_guided(&mut self, seeds: ArrayView2<'_, f64>) -> Array2<f64> {
        let population = guided_population(&mut self.rng, self.p, self.d, seeds);
        self.reset_history();
        population
    }

    fn iterate(
        &mut self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
    ) -> Array2<f64> {
        // Update personal and global bests; `<=` lets later equal
        // fitness refresh the holder.
        for i in 0..self.p {
            if fitness[i] <= self.pbest_fitness[i] {
                self.pbest.row_mut(i).assign(&population.row(i));
                self.pbest_fitness[i] = fitness[i];
            }
            if fitness[i] <= self.gbest_fitness {
                self.gbest.assign(&population.row(i));
                self.gbest_fitness = fitness[i];
            }
        }

        // Velocity update with fresh scalar r1, r2 per particle.
        let (w, c1, c2) = (self.w, self.c1, self.c2);
        for i in 0..self.p {
            let r1: f64 = self.rng.random();
            let r2: f64 = self.rng.random();
            let updated = Zip::from(self.velocities.row(i))
                .and(self.pbest.row(i))
                .and(&self.gbest)
                .and(population.row(i))
                .map_collect(|&v, &pb, &gb, &x| w * v + c1 * r1 * (pb - x) + c2 * r2 * (gb - x));
            self.velocities.row_mut(i).assign(&updated);
        }

        let mut next = population.to_owned();
        next += &self.velocities;
        next
    }

    fn snapshot(&self) -> SamplerSnapshot {
        SamplerSnapshot::ParticleSwarm(self.clone())
    }
}
