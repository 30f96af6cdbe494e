//! Shared numerics: Gaussian draws, symmetric eigendecomposition, key
//! mapping helpers.

mod eigen;
mod gaussian;

pub use eigen::{eigen_symmetric, SymmetricEigen};
pub use gaussian::{inverse_std_normal_cdf, standard_normal};

/// Maps a key in `[0, 1)` to a value in `[lower, upper)`.
///
/// This is the usual decoding step for box-constrained continuous
/// problems.
pub fn value_in(key: f64, lower: f64, upper: f64) -> f64 {
    debug_assert!((upper - lower).is_finite(), "invalid range");
    lower + (upper - lower) * key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_in_maps_endpoints() {
        assert_eq!(value_in(0.0, -5.0, 5.0), -5.0);
        assert_eq!(value_in(0.5, -5.0, 5.0), 0.0);
        assert!(value_in(0.9999999, -5.0, 5.0) < 5.0);
    }
}
