//! Log-space summation primitives.
//!
//! Copula densities are products of many factors that individually overflow or
//! underflow in double precision, so the engine works with log-values and only
//! exponentiates relative to a running maximum.
//!
//! Numerical notes:
//! - `log1mexp(x) = log(1 - e^{-x})` has two conditioning regimes. For `x <= ln 2`
//!   we use `log(-expm1(-x))`, otherwise `log1p(-exp(-x))` (Mächler, 2012).
//! - `log1pexp(x) = log(1 + e^x)` is a two-term log-sum-exp against `0`.

use crate::error::CopulaError;

/// Compute `log Σ x_i` for strictly positive `x_i`.
///
/// The largest log-value is factored out before exponentiating.
///
/// # Errors
/// `CopulaError::Domain` if `x` is empty or any entry is `<= 0` (or NaN).
pub fn log_sum(x: &[f64]) -> Result<f64, CopulaError> {
    if x.is_empty() {
        return Err(CopulaError::domain("log of an empty sum"));
    }
    let mut lx = Vec::with_capacity(x.len());
    for &v in x {
        // `!(v > 0.0)` also rejects NaN.
        if !(v > 0.0) {
            return Err(CopulaError::domain(format!("log of non-positive value {v}")));
        }
        lx.push(v.ln());
    }
    Ok(log_sum_exp(&lx))
}

/// Compute `log Σ exp(lx_i)` for log-values `lx_i`.
///
/// Returns `-inf` when every term is `-inf` (an empty sum).
pub fn log_sum_exp(lx: &[f64]) -> f64 {
    let max = lx.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let acc: f64 = lx.iter().map(|&v| (v - max).exp()).sum();
    max + acc.ln()
}

/// Compute `log |Σ x_i|` where the `x_i` may be negative.
///
/// Terms are sorted by `log |x_i|` and accumulated relative to the largest
/// magnitude, each with its own sign. The sign of the total is *not* returned:
/// callers must know it independently.
pub fn log_signed_sum(x: &[f64]) -> f64 {
    let log_abs: Vec<f64> = x.iter().map(|v| v.abs().ln()).collect();
    let signs: Vec<f64> = x.iter().map(|&v| if v < 0.0 { -1.0 } else { 1.0 }).collect();
    log_signed_sum_exp(&log_abs, &signs)
}

/// Signed log-sum-exp: `log |Σ s_i · exp(lx_i)|`.
///
/// `signs` holds `±1` per term (a `0` sign drops the term). This is the form
/// used when the terms themselves would overflow if exponentiated.
///
/// # Panics
/// Panics if `log_abs` and `signs` have different lengths.
pub fn log_signed_sum_exp(log_abs: &[f64], signs: &[f64]) -> f64 {
    assert_eq!(log_abs.len(), signs.len(), "one sign per term");

    let mut terms: Vec<(f64, f64)> = log_abs
        .iter()
        .zip(signs.iter())
        .filter(|(l, s)| **s != 0.0 && **l != f64::NEG_INFINITY)
        .map(|(&l, &s)| (l, s))
        .collect();
    if terms.is_empty() {
        return f64::NEG_INFINITY;
    }

    // Smallest magnitudes first so the running sum loses as little as possible.
    terms.sort_by(|a, b| a.0.total_cmp(&b.0));
    let b_max = terms[terms.len() - 1].0;

    let mut acc = 0.0;
    for (l, s) in &terms {
        acc += s.signum() * (l - b_max).exp();
    }
    b_max + acc.abs().ln()
}

/// Compute `log(1 - exp(-x))` for `x > 0`.
///
/// Returns NaN for `x < 0` and `-inf` at `x = 0`.
pub fn log1mexp(x: f64) -> f64 {
    if x <= std::f64::consts::LN_2 {
        (-(-x).exp_m1()).ln()
    } else {
        (-(-x).exp()).ln_1p()
    }
}

/// Compute `log(1 + exp(x))`.
pub fn log1pexp(x: f64) -> f64 {
    // logaddexp(0, x)
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn log_sum_matches_naive_sum() {
        let x = [0.5, 1.5, 3.0];
        assert_relative_eq!(log_sum(&x).unwrap(), 5.0_f64.ln(), epsilon = 1e-14);
    }

    #[test]
    fn log_sum_survives_underflow() {
        // Naively each term underflows to 0.
        let x = [1e-320, 1e-320];
        let got = log_sum(&x).unwrap();
        assert_relative_eq!(got, 2.0_f64.ln() + 1e-320_f64.ln(), max_relative = 1e-3);
    }

    #[test]
    fn log_sum_rejects_non_positive() {
        assert!(matches!(log_sum(&[1.0, 0.0]), Err(CopulaError::Domain(_))));
        assert!(matches!(log_sum(&[1.0, -2.0]), Err(CopulaError::Domain(_))));
        assert!(matches!(log_sum(&[f64::NAN]), Err(CopulaError::Domain(_))));
        assert!(log_sum(&[]).is_err());
    }

    #[test]
    fn signed_sum_handles_negative_terms() {
        let x = [4.0, -1.5, 0.5];
        assert_relative_eq!(log_signed_sum(&x), 3.0_f64.ln(), epsilon = 1e-14);
    }

    #[test]
    fn signed_sum_in_log_space_avoids_overflow() {
        // exp(800) - exp(799) = exp(799) * (e - 1)
        let got = log_signed_sum_exp(&[800.0, 799.0], &[1.0, -1.0]);
        assert_relative_eq!(got, 799.0 + (std::f64::consts::E - 1.0).ln(), epsilon = 1e-12);
    }

    #[test]
    fn signed_sum_drops_zero_terms() {
        let got = log_signed_sum_exp(&[f64::NEG_INFINITY, 1.0, 2.0], &[-1.0, 0.0, 1.0]);
        assert_relative_eq!(got, 2.0, epsilon = 1e-15);
        assert_eq!(log_signed_sum_exp(&[], &[]), f64::NEG_INFINITY);
    }

    #[test]
    fn log1mexp_is_accurate_on_both_branches() {
        for &x in &[1e-10_f64, 0.1, 0.5, std::f64::consts::LN_2, 1.0, 5.0] {
            let naive = (1.0 - (-x).exp()).ln();
            let got = log1mexp(x);
            if x > 1e-6 {
                assert_relative_eq!(got, naive, max_relative = 1e-9);
            } else {
                // naive form has lost most digits here; compare to the series.
                assert_relative_eq!(got, x.ln() - x / 2.0, max_relative = 1e-9);
            }
        }
        assert!(log1mexp(-1.0).is_nan());
    }

    #[test]
    fn log1pexp_matches_definition_and_saturates() {
        for &x in &[-5.0_f64, -1.0, 0.0, 1.0, 30.0] {
            assert_relative_eq!(log1pexp(x), (1.0 + x.exp()).ln(), max_relative = 1e-12);
        }
        assert_relative_eq!(log1pexp(1000.0), 1000.0, epsilon = 1e-12);
        assert_relative_eq!(log1pexp(-1000.0), 0.0, epsilon = 1e-300);
    }
}
