//! Ackley function.

use std::f64::consts::{E, PI};

use metaheur_core::math::value_in;
use metaheur_core::{Goal, Problem};
use ndarray::ArrayView1;

/// Nearly flat outer region with a deep funnel at the origin; minimum 0
/// there. Search box `[-32.768, 32.768]` per axis.
#[derive(Debug, Clone)]
pub struct Ackley {
    d: usize,
}

impl Ackley {
    /// Search range per axis.
    pub const BOUNDS: (f64, f64) = (-32.768, 32.768);

    /// Creates the `d`-dimensional Ackley problem.
    pub fn new(d: usize) -> Self {
        Self { d }
    }
}

impl Problem for Ackley {
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
        let n = self.d as f64;
        let sum_sq: f64 = x.iter().map(|&v| v * v).sum();
        let sum_cos: f64 = x.iter().map(|&v| (2.0 * PI * v).cos()).sum();
        -20.0 * (-0.2 * (sum_sq / n).sqrt()).exp() - (sum_cos / n).exp() + 20.0 + E
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn optimum_at_center_key() {
        let problem = Ackley::new(6);
        let keys = Array1::from_elem(6, 0.5);
        assert!(problem.objective(&problem.decode(keys.view())).abs() < 1e-9);
    }
}
