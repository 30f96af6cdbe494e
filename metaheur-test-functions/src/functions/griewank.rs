//! Griewank function.

use metaheur_core::math::value_in;
use metaheur_core::{Goal, Problem};
use ndarray::ArrayView1;

/// Many widespread local minima from the cosine product over a
/// quadratic bowl; minimum 0 at the origin. Search box `[-600, 600]`
/// per axis.
#[derive(Debug, Clone)]
pub struct Griewank {
    d: usize,
}

impl Griewank {
    /// Search range per axis.
    pub const BOUNDS: (f64, f64) = (-600.0, 600.0);

    /// Creates the `d`-dimensional Griewank problem.
    pub fn new(d: usize) -> Self {
        Self { d }
    }
}

impl Problem for Griewank {
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
        let sum: f64 = x.iter().map(|&v| v * v).sum::<f64>() / 4000.0;
        let product: f64 = x
            .iter()
            .enumerate()
            .map(|(i, &v)| (v / ((i + 1) as f64).sqrt()).cos())
            .product();
        1.0 + sum - product
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn optimum_at_center_key() {
        let problem = Griewank::new(8);
        let keys = Array1::from_elem(8, 0.5);
        assert!(problem.objective(&problem.decode(keys.view())).abs() < 1e-12);
    }
}
