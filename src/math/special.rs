//! Special-function helpers for the Gumbel density.
//!
//! The Gumbel joint density expands the `d`-th generator derivative into a sum
//! of `d` terms, each of which needs a falling factorial, `ln j!`, and a
//! truncated exponential series (a Poisson CDF scaled by `e^x`).

use statrs::function::factorial::ln_factorial;

use crate::math::logspace::log_sum_exp;

/// `log Σ_{k=0}^{m} x^k / k!` for `x >= 0`.
///
/// This equals `x + log P(Poisson(x) <= m)`. Evaluating the partial sum
/// directly keeps it finite for large `x`, where the Poisson CDF itself
/// underflows.
pub fn log_exp_partial_sum(m: u64, x: f64) -> f64 {
    if x == 0.0 {
        // Only the k = 0 term survives.
        return 0.0;
    }
    let lx = x.ln();
    let terms: Vec<f64> = (0..=m).map(|k| k as f64 * lx - ln_factorial(k)).collect();
    log_sum_exp(&terms)
}

/// `log P(X <= m)` for `X ~ Poisson(lambda)`.
pub fn poisson_log_cdf(m: u64, lambda: f64) -> f64 {
    log_exp_partial_sum(m, lambda) - lambda
}

/// `log |(a)_d|` where `(a)_d = a (a - 1) ⋯ (a - d + 1)` is the falling factorial.
///
/// Returns `-inf` when one of the factors is exactly zero.
pub fn log_abs_falling_factorial(a: f64, d: usize) -> f64 {
    (0..d).map(|i| (a - i as f64).abs().ln()).sum()
}

/// `ln k!` for a non-negative integer.
pub fn log_factorial(k: u64) -> f64 {
    ln_factorial(k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use statrs::distribution::{DiscreteCDF, Poisson};

    #[test]
    fn poisson_log_cdf_matches_statrs() {
        for &lambda in &[0.3, 1.0, 4.5, 12.0] {
            let dist = Poisson::new(lambda).unwrap();
            for m in 0..6u64 {
                assert_relative_eq!(
                    poisson_log_cdf(m, lambda),
                    dist.cdf(m).ln(),
                    max_relative = 1e-10
                );
            }
        }
    }

    #[test]
    fn partial_sum_stays_finite_for_large_argument() {
        // P(X <= 2) for lambda = 2000 underflows; the partial sum does not.
        let got = log_exp_partial_sum(2, 2000.0);
        let expected = (1.0 + 2000.0 + 2000.0_f64.powi(2) / 2.0).ln();
        assert_relative_eq!(got, expected, max_relative = 1e-12);
        assert_eq!(log_exp_partial_sum(3, 0.0), 0.0);
    }

    #[test]
    fn falling_factorial_log_magnitude() {
        // (2.5)_3 = 2.5 * 1.5 * 0.5
        assert_relative_eq!(
            log_abs_falling_factorial(2.5, 3),
            (2.5_f64 * 1.5 * 0.5).ln(),
            max_relative = 1e-14
        );
        // (0.8)_3 = 0.8 * (-0.2) * (-1.2): sign dropped
        assert_relative_eq!(
            log_abs_falling_factorial(0.8, 3),
            (0.8_f64 * 0.2 * 1.2).ln(),
            max_relative = 1e-14
        );
        assert_eq!(log_abs_falling_factorial(2.0, 3), f64::NEG_INFINITY);
    }

    #[test]
    fn log_factorial_small_values() {
        assert_eq!(log_factorial(0), 0.0);
        assert_relative_eq!(log_factorial(5), 120.0_f64.ln(), max_relative = 1e-14);
    }
}
