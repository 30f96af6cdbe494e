//! Symmetric eigendecomposition via the cyclic Jacobi method.
//!
//! CMA-ES only decomposes small-to-moderate covariance matrices and
//! does so on a lazy cadence, so an O(d^3)-per-sweep Jacobi iteration
//! is adequate and keeps the crate free of LAPACK bindings.

use ndarray::{Array1, Array2};

/// Result of [`eigen_symmetric`]: `values[j]` pairs with column `j` of
/// `vectors`.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues, unsorted.
    pub values: Array1<f64>,
    /// Orthonormal eigenvectors as matrix columns.
    pub vectors: Array2<f64>,
}

const MAX_SWEEPS: usize = 100;

/// Decomposes a symmetric matrix into eigenvalues and eigenvectors.
///
/// The input is assumed symmetric; only its lower/upper agreement up to
/// rounding matters since rotations are applied symmetrically. Sweeps
/// stop when the off-diagonal mass is negligible relative to the
/// diagonal.
pub fn eigen_symmetric(matrix: &Array2<f64>) -> SymmetricEigen {
    let n = matrix.nrows();
    debug_assert_eq!(n, matrix.ncols(), "matrix must be square");

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    if n <= 1 {
        return SymmetricEigen {
            values: a.diag().to_owned(),
            vectors: v,
        };
    }

    let scale: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(1.0);
    let tol = 1e-14 * scale;

    for _ in 0..MAX_SWEEPS {
        let off: f64 = off_diagonal_norm(&a);
        if off <= tol {
            break;
        }
        for p in 0..n - 1 {
            for q in p + 1..n {
                let apq = a[[p, q]];
                if apq.abs() <= tol / (n * n) as f64 {
                    continue;
                }
                let app = a[[p, p]];
                let aqq = a[[q, q]];
                let theta = (aqq - app) / (2.0 * apq);
                // Smaller-angle root for numerical stability.
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..n {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                // Kill the rotated pair exactly.
                a[[p, q]] = 0.0;
                a[[q, p]] = 0.0;

                for k in 0..n {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    SymmetricEigen {
        values: a.diag().to_owned(),
        vectors: v,
    }
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    let mut sum = 0.0;
    for i in 0..n {
        for j in 0..n {
            if i != j {
                sum += a[[i, j]] * a[[i, j]];
            }
        }
    }
    sum.sqrt()
}
