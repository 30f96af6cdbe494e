//! Sphere function.

use metaheur_core::math::value_in;
use metaheur_core::{Goal, Problem};
use ndarray::ArrayView1;

/// The smoke-test function: unimodal, separable, minimum 0 at the
/// origin. Search box `[-5.12, 5.12]` per axis.
#[derive(Debug, Clone)]
pub struct Sphere {
    d: usize,
}

impl Sphere {
    /// Search range per axis.
    pub const BOUNDS: (f64, f64) = (-5.12, 5.12);

    /// Creates the `d`-dimensional sphere problem.
    pub fn new(d: usize) -> Self {
        Self { d }
    }
}

impl Problem for Sphere {
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
        x.iter().map(|&v| v * v).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn optimum_at_center_key() {
        let problem = Sphere::new(5);
        let keys = Array1::from_elem(5, 0.5);
        assert!(problem.objective(&problem.decode(keys.view())).abs() < 1e-12);
    }
}
