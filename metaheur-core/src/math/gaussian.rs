//! Gaussian draws via the inverse standard-normal CDF.
//!
//! Sampling normals as `Phi^-1(u)` of a uniform draw keeps results
//! bit-reproducible for a given uniform stream, unlike rejection or
//! Box-Muller schemes which consume a data-dependent number of draws.

use rand::Rng;

const INV_P1: [f64; 7] = [
    0.160304955844066229311e2,
    -0.90784959262960326650e2,
    0.18644914861620987391e3,
    -0.16900142734642382420e3,
    0.6545466284794487048e2,
    -0.864213011587247794e1,
    0.1760587821390590,
];

const INV_Q1: [f64; 7] = [
    0.147806470715138316110e2,
    -0.91374167024260313396e2,
    0.21015790486205317714e3,
    -0.22210254121855132366e3,
    0.10760453916055123830e3,
    -0.206010730328265443e2,
    0.1e1,
];

const INV_P2: [f64; 8] = [
    -0.152389263440726128e-1,
    0.3444556924136125216,
    -0.29344398672542478687e1,
    0.11763505705217827302e2,
    -0.22655292823101104193e2,
    0.19121334396580330163e2,
    -0.5478927619598318769e1,
    0.237516689024448,
];

const INV_Q2: [f64; 8] = [
    -0.108465169602059954e-1,
    0.2610628885843078511,
    -0.24068318104393757995e1,
    0.10695129973387014469e2,
    -0.23716715521596581025e2,
    0.24640158943917284883e2,
    -0.10014376349783070835e2,
    0.1e1,
];

const INV_P3: [f64; 11] = [
    0.56451977709864482298e-4,
    0.53504147487893013765e-2,
    0.12969550099727352403,
    0.10426158549298266122e1,
    0.28302677901754489974e1,
    0.26255672879448072726e1,
    0.20789742630174917228e1,
    0.72718806231556811306,
    0.66816807711804989575e-1,
    -0.17791004575111759979e-1,
    0.22419563223346345828e-2,
];

const INV_Q3: [f64; 9] = [
    0.56451699862760651514e-4,
    0.53505587067930653953e-2,
    0.12986615416911646934,
    0.10542932232626491195e1,
    0.30379331173522206237e1,
    0.37631168536405028901e1,
    0.38782858277042011263e1,
    0.20372431817412177929e1,
    0.1e1,
];

const SQRT_2: f64 = 1.41421356237309504880;

/// Inverse of the standard normal cumulative distribution function.
///
/// Rational-polynomial approximation accurate to roughly `1e-9` over
/// the open unit interval; returns the appropriate infinity at 0 and 1.
pub fn inverse_std_normal_cdf(probability: f64) -> f64 {
    if probability <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if probability >= 1.0 {
        return f64::INFINITY;
    }

    // Transform to an argument of the inverse error function.
    let mut x = 2.0 * probability - 1.0;
    let negative = x < 0.0;
    if negative {
        x = -x;
    }

    let mut z: f64;
    if x <= 0.75 {
        let y = x * x - 0.5625;
        let mut v = 0.0;
        let mut w = 0.0;
        for i in (0..7).rev() {
            v = v * y + INV_P1[i];
            w = w * y + INV_Q1[i];
        }
        z = v / w * x;
    } else if x <= 0.9375 {
        let y = x * x - 0.87890625;
        let mut v = 0.0;
        let mut w = 0.0;
        for i in (0..8).rev() {
            v = v * y + INV_P2[i];
            w = w * y + INV_Q2[i];
        }
        z = v / w * x;
    } else {
        let y = if probability > 0.5 {
            1.0 / (-(1.0 - x).ln()).sqrt()
        } else {
            1.0 / (-(2.0 * probability).ln()).sqrt()
        };
        let mut v = 0.0;
        for i in (0..11).rev() {
            v = v * y + INV_P3[i];
        }
        let mut w = 0.0;
        for i in (0..9).rev() {
            w = w * y + INV_Q3[i];
        }
        z = v / w / y;
    }

    if negative {
        if probability < 1.0e-105 {
            // Far tail: asymptotic erfc series plus one Newton step.
            const SQRT_PI: f64 = 1.77245385090551602729;
            let w = (-z * z).exp() / SQRT_PI;
            let y = 2.0 * z * z;
            let mut v = 1.0;
            let mut term = 1.0;
            for i in 0..6 {
                term *= -f64::from(2 * i + 1) / y;
                v += term;
            }
            z -= probability / w - 0.5 * v / z;
        }
        -(z * SQRT_2)
    } else {
        z * SQRT_2
    }
}

/// Draws one standard normal from a uniform stream.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    inverse_std_normal_cdf(rng.random::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn median_is_zero() {
        assert!(inverse_std_normal_cdf(0.5).abs() < 1e-12);
    }

    #[test]
    fn known_quantiles() {
        // Phi(1) ~ 0.8413447460685429, Phi(-2) ~ 0.022750131948179195
        assert!((inverse_std_normal_cdf(0.8413447460685429) - 1.0).abs() < 1e-8);
        assert!((inverse_std_normal_cdf(0.022750131948179195) + 2.0).abs() < 1e-8);
    }

    #[test]
    fn symmetry() {
        for &p in &[0.01, 0.1, 0.3, 0.45] {
            let lo = inverse_std_normal_cdf(p);
            let hi = inverse_std_normal_cdf(1.0 - p);
            assert!((lo + hi).abs() < 1e-8, "asymmetric at p={p}");
        }
    }

    #[test]
    fn endpoints_are_infinite() {
        assert_eq!(inverse_std_normal_cdf(0.0), f64::NEG_INFINITY);
        assert_eq!(inverse_std_normal_cdf(1.0), f64::INFINITY);
    }

    #[test]
    fn draws_are_reproducible() {
        let mut a = ChaCha12Rng::seed_from_u64(7);
        let mut b = ChaCha12Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(standard_normal(&mut a), standard_normal(&mut b));
        }
    }

    #[test]
    fn sample_moments_are_plausible() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let n = 20_000;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for _ in 0..n {
            let z = standard_normal(&mut rng);
            sum += z;
            sum_sq += z * z;
        }
        let mean = sum / n as f64;
        let var = sum_sq / n as f64 - mean * mean;
        assert!(mean.abs() < 0.05, "mean={mean}");
        assert!((var - 1.0).abs() < 0.05, "var={var}");
    }
}
