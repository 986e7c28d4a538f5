//! Polylogarithm of negative integer order via Eulerian numbers.
//!
//! For `n >= 1`:
//!
//! ```text
//! Li_{-n}(z) = z · A_n(z) / (1 - z)^{n+1},    A_n(z) = Σ_{k=0}^{n-1} A(n, k) z^k
//! ```
//!
//! where `A(n, k)` are the Eulerian numbers. Only the log of the result is
//! returned, so the `(1 - z)^{-(n+1)}` blow-up near `z → 1` stays representable.
//!
//! The coefficients are held as `f64`. They grow combinatorially with `n`
//! (the replicate count minus one), so for large `n` the polynomial loses
//! precision; no extended-precision fallback is attempted.

use crate::error::CopulaError;
use crate::math::logspace::log1mexp;

/// Row `n` of the Eulerian triangle: `[A(n, 0), …, A(n, n-1)]`.
///
/// Built from the recurrence
/// `A(i, j) = (i - j)·A(i-1, j-1) + (j + 1)·A(i-1, j)` with `A(i, 0) = 1`
/// and `A(i, j) = 0` for `j >= i`. Row `0` is `[1]` so that
/// `Li_0(z) = z / (1 - z)` falls out of the same formula.
pub fn eulerian_row(n: usize) -> Vec<f64> {
    if n == 0 {
        return vec![1.0];
    }

    let mut table = vec![vec![0.0_f64; n + 1]; n + 1];
    for i in 1..=n {
        for j in 0..i {
            table[i][j] = if j == 0 {
                1.0
            } else {
                (i - j) as f64 * table[i - 1][j - 1] + (j + 1) as f64 * table[i - 1][j]
            };
        }
    }

    table.swap_remove(n).into_iter().take(n).collect()
}

/// Evaluate a polynomial with coefficients ordered from highest degree to
/// the constant term (Horner's scheme).
pub fn polyval(coef: &[f64], x: f64) -> f64 {
    coef.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// `log Li_s(z)` for each `z` in `(0, 1)`, with `s = order <= 0`.
///
/// # Errors
/// - `CopulaError::Domain` if `order > 0`.
/// - `CopulaError::Domain` if any `z` lies outside `[0, 1)`. `z = 0` yields `-inf`.
pub fn polylog(z: &[f64], order: i32) -> Result<Vec<f64>, CopulaError> {
    let n = negative_order(order)?;
    if let Some(bad) = z.iter().find(|v| !(**v >= 0.0 && **v < 1.0)) {
        return Err(CopulaError::domain(format!(
            "polylog argument {bad} outside [0, 1)"
        )));
    }

    let coef = eulerian_row(n);
    let np1 = (n + 1) as f64;
    Ok(z
        .iter()
        .map(|&zi| polyval(&coef, zi).ln() + zi.ln() - np1 * (-zi).ln_1p())
        .collect())
}

/// `log Li_s(e^w)` for log-arguments `w < 0`.
///
/// Uses `log(1 - e^w) = log1mexp(-w)` so arguments very close to `1` keep
/// their precision.
///
/// # Errors
/// Same as [`polylog`], with the argument domain `w < 0`.
pub fn polylog_log_z(w: &[f64], order: i32) -> Result<Vec<f64>, CopulaError> {
    let n = negative_order(order)?;
    if let Some(bad) = w.iter().find(|v| !(**v < 0.0)) {
        return Err(CopulaError::domain(format!(
            "polylog log-argument {bad} must be negative"
        )));
    }

    let coef = eulerian_row(n);
    let np1 = (n + 1) as f64;
    Ok(w
        .iter()
        .map(|&wi| polyval(&coef, wi.exp()).ln() + wi - np1 * log1mexp(-wi))
        .collect())
}

fn negative_order(order: i32) -> Result<usize, CopulaError> {
    if order > 0 {
        return Err(CopulaError::domain(format!(
            "polylog order must be a non-positive integer, got {order}"
        )));
    }
    Ok(order.unsigned_abs() as usize)
}
