//! Covariance matrix adaptation evolution strategy.
//!
//! Full CMA-ES with weighted recombination, cumulative evolution paths,
//! rank-one and rank-mu covariance updates (optionally with active
//! negative updates of the worst directions), an optional diagonal-only
//! warm-start phase, lazy eigendecomposition refresh, and the standard
//! battery of convergence checks. Once converged the sampler becomes a
//! no-op that returns its input unchanged.
//!
//! Gaussian draws go through the inverse-CDF transform so a given seed
//! reproduces the exact same sample stream.

use std::collections::VecDeque;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::math::standard_normal;
use crate::problem::KEY_MAX;
use crate::sampler::{
    argmin, guided_population, sorted_indices, uniform_population, Sampler, SamplerSnapshot,
};

/// Parameters for [`CovarianceMatrixAdaptation`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CmaesConfig {
    /// Initial step size on the unit-box scale.
    pub sigma0: f64,
    /// Generations of cheap diagonal-only covariance adaptation before
    /// switching to the full matrix; 0 runs full from the start.
    pub diagonal_only: u64,
    /// Enables active (negative) covariance updates that down-weight
    /// the worst directions.
    pub active: bool,
}

impl Default for CmaesConfig {
    fn default() -> Self {
        Self {
            sigma0: 0.3,
            diagonal_only: 0,
            active: true,
        }
    }
}

/// CMA-ES sampler.
///
/// The adaptive state is created lazily on the first `iterate` call,
/// seeding the distribution mean from the best individual of the
/// supplied population; `initialize` clears it again. Does not accept
/// immigrants: an injected individual would corrupt the sampled-point
/// bookkeeping behind the distribution update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CovarianceMatrixAdaptation {
    d: usize,
    p: usize,
    sigma0: f64,
    diagonal_only: u64,
    active: bool,
    rng: ChaCha12Rng,
    state: Option<CmaState>,
}

impl CovarianceMatrixAdaptation {
    /// Creates a sampler with `sigma0 = 0.3`, full covariance and
    /// active updates.
    pub fn new(dimension: usize, population: usize, seed: u64) -> Result<Self> {
        Self::with_config(dimension, population, seed, CmaesConfig::default())
    }

    /// Creates a sampler with explicit parameters.
    pub fn with_config(
        dimension: usize,
        population: usize,
        seed: u64,
        config: CmaesConfig,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidDimensions { dimensions: dimension });
        }
        if population < 4 {
            return Err(Error::PopulationTooSmall {
                population,
                minimum: 4,
            });
        }
        if !(config.sigma0 > 0.0 && config.sigma0.is_finite()) {
            return Err(Error::InvalidFraction {
                name: "sigma0",
                value: config.sigma0,
                range: "(0, inf)",
            });
        }
        Ok(Self {
            d: dimension,
            p: population,
            sigma0: config.sigma0,
            diagonal_only: config.diagonal_only,
            active: config.active,
            rng: ChaCha12Rng::seed_from_u64(seed),
            state: None,
        })
    }

    /// Whether the internal convergence checks have fired.
    pub fn converged(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.converged)
    }
}

impl Sampler for CovarianceMatrixAdaptation {
    fn dimension(&self) -> usize {
        self.d
    }

    fn population_size(&self) -> usize {
        self.p
    }

    fn initialize(&mut self) -> Array2<f64> {
        self.state = None;
        uniform_population(&mut self.rng, self.p, self.d)
    }

    fn initialize_guided(&mut self, seeds: ArrayView2<'_, f64>) -> Array2<f64> {
        self.state = None;
        guided_population(&mut self.rng, self.p, self.d, seeds)
    }

    fn iterate(
        &mut self,
        population: ArrayView2<'_, f64>,
        fitness: ArrayView1<'_, f64>,
    ) -> Array2<f64> {
        if self.converged() {
            return population.to_owned();
        }
        match self.state.as_mut() {
            None => {
                let (best, best_value) = argmin(fitness);
                self.state = Some(CmaState::new(
                    self.d,
                    self.p,
                    self.sigma0,
                    self.diagonal_only,
                    population.row(best),
                    best_value,
                ));
            }
            Some(state) => {
                // The previous call's samples are in arx/arz; fold
                // their fitness back into the distribution.
                state.update_distribution(fitness, self.active);
            }
        }
        let state = self.state.as_mut().expect("state initialized above");
        state.sample(&mut self.rng)
    }

    fn snapshot(&self) -> SamplerSnapshot {
        SamplerSnapshot::CovarianceMatrixAdaptation(self.clone())
    }
}

/// Complete adaptive state of a running CMA-ES instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CmaState {
    d: usize,
    lambda: usize,
    mu: usize,
    weights: Array1<f64>,
    mu_eff: f64,
    cc: f64,
    cs: f64,
    damps: f64,
    ccov1: f64,
    ccovmu: f64,
    ccov1_sep: f64,
    ccovmu_sep: f64,
    chi_n: f64,
    stop_tol_up_x: f64,
    stop_tol_x: f64,
    stop_tol_fun: f64,
    stop_tol_hist_fun: f64,
    xmean: Array1<f64>,
    sigma: f64,
    b: Array2<f64>,
    diag_d: Array1<f64>,
    bd: Array2<f64>,
    c: Array2<f64>,
    diag_c: Array1<f64>,
    pc: Array1<f64>,
    ps: Array1<f64>,
    norm_ps: f64,
    arz: Array2<f64>,
    arx: Array2<f64>,
    best_value: f64,
    fitness_history: VecDeque<f64>,
    history_capacity: usize,
    diagonal: bool,
    diagonal_until: u64,
    generation: u64,
    last_eigen_refresh: u64,
    converged: bool,
}

impl CmaState {
    fn new(
        d: usize,
        lambda: usize,
        sigma0: f64,
        diagonal_only: u64,
        guess: ArrayView1<'_, f64>,
        best_value: f64,
    ) -> Self {
        let df = d as f64;
        let mu = lambda / 2;

        // Log-linear recombination weights, normalized to sum 1.
        let log_mu2 = (mu as f64 + 0.5).ln();
        let mut weights = Array1::from_shape_fn(mu, |i| log_mu2 - ((i + 1) as f64).ln());
        let sum_w: f64 = weights.sum();
        let sum_wq: f64 = weights.iter().map(|w| w * w).sum();
        let mu_eff = sum_w * sum_w / sum_wq;
        weights /= sum_w;

        let cc = (4.0 + mu_eff / df) / (df + 4.0 + 2.0 * mu_eff / df);
        let cs = (mu_eff + 2.0) / (df + mu_eff + 3.0);
        let damps = 1.0 + 2.0 * (((mu_eff - 1.0) / (df + 1.0)).sqrt() - 1.0).max(0.0) + cs;
        let ccov1 = 2.0 / ((df + 1.3) * (df + 1.3) + mu_eff);
        let ccovmu =
            (1.0 - ccov1).min(2.0 * (mu_eff - 2.0 + 1.0 / mu_eff) / ((df + 2.0) * (df + 2.0) + mu_eff));
        let ccov1_sep = 1.0_f64.min(ccov1 * (df + 1.5) / 3.0);
        let ccovmu_sep = (1.0 - ccov1).min(ccovmu * (df + 1.5) / 3.0);
        let chi_n = df.sqrt() * (1.0 - 1.0 / (4.0 * df) + 1.0 / (21.0 * df * df));

        let history_capacity = 10 + (30.0 * df / lambda as f64) as usize;
        let mut fitness_history = VecDeque::with_capacity(history_capacity);
        fitness_history.extend(std::iter::repeat(f64::MAX).take(history_capacity));

        let mut state = Self {
            d,
            lambda,
            mu,
            weights,
            mu_eff,
            cc,
            cs,
            damps,
            ccov1,
            ccovmu,
            ccov1_sep,
            ccovmu_sep,
            chi_n,
            stop_tol_up_x: 1e3 * sigma0,
            stop_tol_x: 1e-11 * sigma0,
            stop_tol_fun: 1e-12,
            stop_tol_hist_fun: 1e-13,
            xmean: guess.to_owned(),
            sigma: sigma0,
            b: Array2::eye(d),
            diag_d: Array1::ones(d),
            bd: Array2::eye(d),
            c: Array2::eye(d),
            diag_c: Array1::ones(d),
            pc: Array1::zeros(d),
            ps: Array1::zeros(d),
            norm_ps: 0.0,
            arz: Array2::zeros((d, lambda)),
            arx: Array2::zeros((d, lambda)),
            best_value,
            fitness_history,
            history_capacity,
            diagonal: diagonal_only > 0,
            diagonal_until: diagonal_only,
            generation: 0,
            last_eigen_refresh: 0,
            converged: false,
        };
        state.push_history(best_value);
        state
    }

    fn push_history(&mut self, value: f64) {
        self.fitness_history.push_front(value);
        while self.fitness_history.len() > self.history_capacity {
            self.fitness_history.pop_back();
        }
    }

    fn history_range(&self) -> (f64, f64) {
        let mut min = f64::MAX;
        let mut max = f64::MIN;
        for &v in &self.fitness_history {
            if v < min {
                min = v;
            }
            if v > max {
                max = v;
            }
        }
        (min, max)
    }

    fn update_distribution(&mut self, fitness: ArrayView1<'_, f64>, active: bool) {
        let sorted = sorted_indices(fitness);
        let xold = self.xmean.clone();

        let best_arx = select_columns(&self.arx, &sorted[..self.mu]);
        self.xmean = best_arx.dot(&self.weights);
        let best_arz = select_columns(&self.arz, &sorted[..self.mu]);
        let zmean = best_arz.dot(&self.weights);

        let hsig = self.update_evolution_paths(&zmean, &xold);
        if self.diagonal {
            self.update_covariance_diagonal(hsig, &best_arz);
            if self.generation >= self.diagonal_until {
                // Full covariance matrix from now on.
                self.diagonal = false;
                self.b = Array2::eye(self.d);
                self.bd = scaled_columns(&self.b, &self.diag_d);
                self.c = Array2::from_diag(&self.diag_c);
            }
        } else {
            self.update_covariance(hsig, &best_arx, &sorted, &xold, active);
        }

        self.sigma *= ((self.norm_ps / self.chi_n - 1.0) * self.cs / self.damps)
            .min(1.0)
            .exp();

        let best_fitness = fitness[sorted[0]];
        let worst_fitness = fitness[sorted[sorted.len() - 1]];
        if best_fitness < self.best_value {
            self.best_value = best_fitness;
        }

        self.check_convergence(fitness, &sorted, best_fitness, worst_fitness);
        self.push_history(best_fitness);
    }

    fn update_evolution_paths(&mut self, zmean: &Array1<f64>, xold: &Array1<f64>) -> bool {
        let step = self.b.dot(zmean) * (self.cs * (2.0 - self.cs) * self.mu_eff).sqrt();
        self.ps = &self.ps * (1.0 - self.cs) + &step;
        self.norm_ps = self.ps.dot(&self.ps).sqrt();

        let decay = 1.0 - (1.0 - self.cs).powf(2.0 * self.generation as f64);
        let hsig = self.norm_ps / decay.sqrt() / self.chi_n
            < 1.4 + 2.0 / (self.d as f64 + 1.0);

        self.pc *= 1.0 - self.cc;
        if hsig {
            let pull = (&self.xmean - xold)
                * ((self.cc * (2.0 - self.cc) * self.mu_eff).sqrt() / self.sigma);
            self.pc = &self.pc + &pull;
        }
        hsig
    }

    fn update_covariance_diagonal(&mut self, hsig: bool, best_arz: &Array2<f64>) {
        let mut old_fac = if hsig {
            0.0
        } else {
            self.ccov1_sep * self.cc * (2.0 - self.cc)
        };
        old_fac += 1.0 - self.ccov1_sep - self.ccovmu_sep;

        let rank_mu = best_arz.mapv(|z| z * z).dot(&self.weights);
        self.diag_c = &self.diag_c * old_fac
            + &(self.pc.mapv(|x| x * x) * self.ccov1_sep)
            + &((&self.diag_c * &rank_mu) * self.ccovmu_sep);
        // Square roots replace the eigendecomposition in this phase.
        self.diag_d = self.diag_c.mapv(f64::sqrt);
    }

    fn update_covariance(
        &mut self,
        hsig: bool,
        best_arx: &Array2<f64>,
        sorted: &[usize],
        xold: &Array1<f64>,
        active: bool,
    ) {
        let mut negccov = 0.0;
        if self.ccov1 + self.ccovmu > 0.0 {
            let df = self.d as f64;

            // Mu difference vectors on the sigma-free scale.
            let mut arpos = best_arx.clone();
            for mut col in arpos.columns_mut() {
                col -= xold;
            }
            arpos.mapv_inplace(|x| x / self.sigma);

            let rank_one = outer(&self.pc) * self.ccov1;
            let mut old_fac = if hsig {
                0.0
            } else {
                self.ccov1 * self.cc * (2.0 - self.cc)
            };
            old_fac += 1.0 - self.ccov1 - self.ccovmu;

            if active {
                negccov = (1.0 - self.ccovmu) * 0.25 * self.mu_eff
                    / ((df + 2.0).powf(1.5) + 2.0 * self.mu_eff);
                // Keep at least this much variance in every direction;
                // small populations are the critical case.
                let neg_min_residual_variance = 0.66;
                let neg_alpha_old = 0.5;

                // Worst mu samples, worst first.
                let reversed: Vec<usize> = sorted.iter().rev().copied().collect();
                let mut arzneg = select_columns(&self.arz, &reversed[..self.mu]);

                let norms = arzneg.map_axis(Axis(0), |col| col.dot(&col).sqrt());
                let order = {
                    let mut order: Vec<usize> = (0..self.mu).collect();
                    order.sort_by(|&a, &b| {
                        norms[a]
                            .partial_cmp(&norms[b])
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                    order
                };
                let sorted_norms: Vec<f64> = order.iter().map(|&i| norms[i]).collect();
                // Pair the largest norm with the smallest, second largest
                // with second smallest, and so on.
                let ratios: Vec<f64> = (0..self.mu)
                    .map(|i| sorted_norms[self.mu - 1 - i] / sorted_norms[i])
                    .collect();
                let mut inverse_order = vec![0usize; self.mu];
                for (rank, &original) in order.iter().enumerate() {
                    inverse_order[original] = rank;
                }
                let norms_inv =
                    Array1::from_shape_fn(self.mu, |k| ratios[inverse_order[k]]);

                let weighted_sq: f64 = norms_inv
                    .iter()
                    .zip(self.weights.iter())
                    .map(|(n, w)| n * n * w)
                    .sum();
                let negccov_max = (1.0 - neg_min_residual_variance) / weighted_sq;
                if negccov > negccov_max {
                    negccov = negccov_max;
                }

                for (k, mut col) in arzneg.columns_mut().into_iter().enumerate() {
                    col *= norms_inv[k];
                }
                let artmp = self.bd.dot(&arzneg);
                let c_neg = scaled_columns(&artmp, &self.weights).dot(&artmp.t());

                old_fac += neg_alpha_old * negccov;
                let rank_mu = scaled_columns(&arpos, &self.weights).dot(&arpos.t());
                self.c = &self.c * old_fac
                    + &rank_one
                    + &(rank_mu * (self.ccovmu + (1.0 - neg_alpha_old) * negccov))
                    - &(c_neg * negccov);
            } else {
                let rank_mu = scaled_columns(&arpos, &self.weights).dot(&arpos.t());
                self.c = &self.c * old_fac + &rank_one + &(rank_mu * self.ccovmu);
            }
        }
        self.refresh_eigensystem(negccov);
    }

    /// Refreshes B and D from C on a lazy cadence, clamping degenerate
    /// eigenvalues.
    fn refresh_eigensystem(&mut self, negccov: f64) {
        let rate = self.ccov1 + self.ccovmu + negccov;
        if rate <= 0.0 {
            return;
        }
        let interval = (1.0 / (rate * self.d as f64 * 10.0)).max(1.0) as u64;
        if self.generation.saturating_sub(self.last_eigen_refresh) < interval {
            return;
        }
        self.last_eigen_refresh = self.generation;

        // Enforce symmetry from the upper triangle.
        for i in 0..self.d {
            for j in (i + 1)..self.d {
                let v = self.c[[i, j]];
                self.c[[j, i]] = v;
            }
        }

        let eig = crate::math::eigen_symmetric(&self.c);
        self.b = eig.vectors;
        let mut eigenvalues = eig.values;

        let min_ev = fold_min(&eigenvalues);
        if min_ev <= 0.0 {
            for v in eigenvalues.iter_mut() {
                if *v < 0.0 {
                    *v = 0.0;
                }
            }
            let tfac = fold_max(&eigenvalues) / 1e14;
            for i in 0..self.d {
                self.c[[i, i]] += tfac;
            }
            eigenvalues += tfac;
        }
        let (min_ev, max_ev) = (fold_min(&eigenvalues), fold_max(&eigenvalues));
        if max_ev > 1e14 * min_ev {
            let tfac = max_ev / 1e14 - min_ev;
            for i in 0..self.d {
                self.c[[i, i]] += tfac;
            }
            eigenvalues += tfac;
        }

        self.diag_c = self.c.diag().to_owned();
        self.diag_d = eigenvalues.mapv(f64::sqrt);
        self.bd = scaled_columns(&self.b, &self.diag_d);
    }

    fn check_convergence(
        &mut self,
        fitness: ArrayView1<'_, f64>,
        sorted: &[usize],
        best_fitness: f64,
        worst_fitness: f64,
    ) {
        let sqrt_diag_c = self.diag_c.mapv(f64::sqrt);

        // Implied coordinate movement below tolerance in every axis.
        let all_small = (0..self.d).all(|i| {
            self.sigma * self.pc[i].abs().max(sqrt_diag_c[i]) <= self.stop_tol_x
        });
        if all_small {
            self.converged = true;
        }

        // Any coordinate blowing up.
        if sqrt_diag_c
            .iter()
            .any(|&s| self.sigma * s > self.stop_tol_up_x)
        {
            self.converged = true;
        }

        let (history_best, history_worst) = self.history_range();
        if self.generation > 2
            && history_worst.max(worst_fitness) - history_best.min(best_fitness)
                < self.stop_tol_fun
        {
            self.converged = true;
        }
        if self.generation as usize > self.history_capacity
            && history_worst - history_best < self.stop_tol_hist_fun
        {
            self.converged = true;
        }

        if fold_max(&self.diag_d) / fold_min(&self.diag_d) > 1e7 {
            self.converged = true;
        }

        // Flat fitness widens the search instead of stopping it.
        let flat_index = (0.1 + self.lambda as f64 / 4.0) as usize;
        if self.best_value == fitness[sorted[flat_index]] {
            self.sigma *= (0.2 + self.cs / self.damps).exp();
        }
        if self.generation > 2
            && history_worst.max(best_fitness) - history_best.min(best_fitness) == 0.0
        {
            self.sigma *= (0.2 + self.cs / self.damps).exp();
        }
    }

    /// Draws the next generation and records it for the following
    /// distribution update.
    fn sample(&mut self, rng: &mut ChaCha12Rng) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.lambda, self.d));
        for k in 0..self.lambda {
            let z = Array1::from_shape_fn(self.d, |_| standard_normal(rng));
            let x = if self.diagonal {
                &self.xmean + &((&self.diag_d * &z) * self.sigma)
            } else {
                &self.xmean + &(self.bd.dot(&z) * self.sigma)
            };
            let clamped = x.mapv(|v| v.clamp(0.0, KEY_MAX));
            self.arz.column_mut(k).assign(&z);
            self.arx.column_mut(k).assign(&clamped);
            out.row_mut(k).assign(&clamped);
        }
        self.generation += 1;
        out
    }
}

fn select_columns(matrix: &Array2<f64>, indices: &[usize]) -> Array2<f64> {
    Array2::from_shape_fn((matrix.nrows(), indices.len()), |(r, c)| {
        matrix[[r, indices[c]]]
    })
}

fn scaled_columns(matrix: &Array2<f64>, scale: &Array1<f64>) -> Array2<f64> {
    let mut scaled = matrix.clone();
    for (k, mut col) in scaled.columns_mut().into_iter().enumerate() {
        col *= scale[k];
    }
    scaled
}

fn outer(v: &Array1<f64>) -> Array2<f64> {
    let n = v.len();
    Array2::from_shape_fn((n, n), |(i, j)| v[i] * v[j])
}

fn fold_min(v: &Array1<f64>) -> f64 {
    v.iter().copied().fold(f64::MAX, f64::min)
}

fn fold_max(v: &Array1<f64>) -> f64 {
    v.iter().copied().fold(f64::MIN, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn sphere_fitness(population: &Array2<f64>) -> Array1<f64> {
        population.map_axis(Axis(1), |row| {
            row.iter().map(|&k| (k - 0.5) * (k - 0.5)).sum()
        })
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(CovarianceMatrixAdaptation::new(0, 10, 0).is_err());
        assert!(CovarianceMatrixAdaptation::new(5, 3, 0).is_err());
        let bad_sigma = CmaesConfig {
            sigma0: 0.0,
            ..CmaesConfig::default()
        };
        assert!(CovarianceMatrixAdaptation::with_config(5, 10, 0, bad_sigma).is_err());
    }

    #[test]
    fn iterate_returns_population_size_within_bounds() {
        let mut sampler = CovarianceMatrixAdaptation::new(5, 12, 0).unwrap();
        let mut population = sampler.initialize();
        for _ in 0..20 {
            let fitness = sphere_fitness(&population);
            population = sampler.iterate(population.view(), fitness.view());
            assert_eq!(population.shape(), &[12, 5]);
            assert!(
                population.iter().all(|k| (0.0..1.0).contains(k)),
                "CMA-ES output must stay inside the unit box"
            );
        }
    }

    #[test]
    fn diagonal_warm_start_matches_contract() {
        let config = CmaesConfig {
            diagonal_only: 5,
            ..CmaesConfig::default()
        };
        let mut sampler = CovarianceMatrixAdaptation::with_config(4, 10, 0, config).unwrap();
        let mut population = sampler.initialize();
        for _ in 0..12 {
            let fitness = sphere_fitness(&population);
            population = sampler.iterate(population.view(), fitness.view());
            assert_eq!(population.shape(), &[10, 4]);
            assert!(population.iter().all(|k| (0.0..1.0).contains(k)));
        }
    }

    #[test]
    fn identical_seeds_are_bit_identical() {
        let mut a = CovarianceMatrixAdaptation::new(6, 10, 5).unwrap();
        let mut b = CovarianceMatrixAdaptation::new(6, 10, 5).unwrap();
        let mut pop_a = a.initialize();
        let mut pop_b = b.initialize();
        for _ in 0..10 {
            assert_eq!(pop_a, pop_b);
            let fitness = sphere_fitness(&pop_a);
            pop_a = a.iterate(pop_a.view(), fitness.view());
            pop_b = b.iterate(pop_b.view(), fitness.view());
        }
    }

    #[test]
    fn initialize_clears_adaptive_state() {
        let mut sampler = CovarianceMatrixAdaptation::new(3, 8, 0).unwrap();
        let population = sampler.initialize();
        let fitness = sphere_fitness(&population);
        let _ = sampler.iterate(population.view(), fitness.view());
        assert!(sampler.state.is_some());
        let _ = sampler.initialize();
        assert!(sampler.state.is_none());
    }

    #[test]
    fn mean_moves_toward_good_region() {
        let mut sampler = CovarianceMatrixAdaptation::new(4, 16, 1).unwrap();
        let mut population = sampler.initialize();
        for _ in 0..30 {
            let fitness = sphere_fitness(&population);
            population = sampler.iterate(population.view(), fitness.view());
            if sampler.converged() {
                break;
            }
        }
        let state = sampler.state.as_ref().unwrap();
        for &m in state.xmean.iter() {
            assert!((m - 0.5).abs() < 0.4, "mean drifted to {m}");
        }
    }

    #[test]
    fn converged_sampler_is_a_no_op() {
        let mut sampler = CovarianceMatrixAdaptation::new(3, 8, 0).unwrap();
        let population = sampler.initialize();
        let fitness = sphere_fitness(&population);
        let _ = sampler.iterate(population.view(), fitness.view());
        sampler.state.as_mut().unwrap().converged = true;
        let frozen = sampler.iterate(population.view(), fitness.view());
        assert_eq!(frozen, population);
    }
}
