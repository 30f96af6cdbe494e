//! Schwefel function.

use metaheur_core::math::value_in;
use metaheur_core::{Goal, Problem};
use ndarray::ArrayView1;

/// Deceptive: the global minimum sits near the boundary at
/// `x = 420.9687` per axis, far from the second-best region. Search box
/// `[-500, 500]` per axis; minimum value approximately 0.
#[derive(Debug, Clone)]
pub struct Schwefel {
    d: usize,
}

impl Schwefel {
    /// Search range per axis.
    pub const BOUNDS: (f64, f64) = (-500.0, 500.0);

    /// Creates the `d`-dimensional Schwefel problem.
    pub fn new(d: usize) -> Self {
        Self { d }
    }
}

impl Problem for Schwefel {
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
        418.9829 * self.d as f64
            - x.iter().map(|&v| v * v.abs().sqrt().sin()).sum::<f64>()
    }
}
