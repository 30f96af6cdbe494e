//! Rosenbrock function.

use metaheur_core::math::value_in;
use metaheur_core::{Goal, Problem};
use ndarray::ArrayView1;

/// The banana valley: easy to reach, hard to traverse; minimum 0 at
/// `(1, ..., 1)`. Search box `[-2.048, 2.048]` per axis.
#[derive(Debug, Clone)]
pub struct Rosenbrock {
    d: usize,
}

impl Rosenbrock {
    /// Search range per axis.
    pub const BOUNDS: (f64, f64) = (-2.048, 2.048);

    /// Creates the `d`-dimensional Rosenbrock problem.
    pub fn new(d: usize) -> Self {
        Self { d }
    }
}

impl Problem for Rosenbrock {
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
        x.windows(2)
            .map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                100.0 * (b - a * a) * (b - a * a) + (1.0 - a) * (1.0 - a)
            })
            .sum()
    }
}
