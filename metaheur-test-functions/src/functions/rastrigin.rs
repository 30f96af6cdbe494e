//! Rastrigin function.

use std::f64::consts::PI;

use metaheur_core::math::value_in;
use metaheur_core::{Goal, Problem};
use ndarray::ArrayView1;

/// Highly multimodal: a field of regularly spaced local minima with the
/// global minimum 0 at the origin. Search box `[-5.12, 5.12]` per axis.
#[derive(Debug, Clone)]
pub struct Rastrigin {
    d: usize,
}

impl Rastrigin {
    /// Search range per axis.
    pub const BOUNDS: (f64, f64) = (-5.12, 5.12);

    /// Creates the `d`-dimensional Rastrigin problem.
    pub fn new(d: usize) -> Self {
        Self { d }
    }
}

impl Problem for Rastrigin {
    type Solution = Vec<f64>;

    fn dimension(&self) -> usize {
        self.d
    }

    fn goal(&self) -> Goal {
        Goal::Minimize
    }

    fn decode(&self, keys: ArrayView1<'_, f64>) -> Vec<f64> {
        keys.iter()
            .map(|&k| value_in(k, Self::BOUNDS.0, Self::BOUNDS.1))
            .collect()
    }

    fn objective(&self, x: &Vec<f64>) -> f64 {
        10.0 * self.d as f64
            + x.iter()
                .map(|&v| v * v - 10.0 * (2.0 * PI * v).cos())
                .sum::<f64>()
    }
}
