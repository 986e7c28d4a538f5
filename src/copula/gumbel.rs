//! Gumbel family.
//!
//! `ψ(t) = exp(-t^{1/θ})`, θ >= 1. The joint density needs the d-th
//! derivative of the generator, which is expanded into `d` signed terms and
//! summed in log space with explicit signs.

use nalgebra::DMatrix;

use crate::copula::{diagonal, map_rows, require_finite, to_scale};
use crate::domain::{Family, PseudoObservations};
use crate::error::CopulaError;
use crate::math::{
    log_abs_falling_factorial, log_exp_partial_sum, log_factorial, log_signed_sum_exp, log_sum,
    log_sum_exp,
};

/// `(-ln x)^θ`, or `θ·ln(-ln x)` in log space.
pub fn ipsi(u: &DMatrix<f64>, theta: f64, log: bool) -> DMatrix<f64> {
    if log {
        u.map(|x| theta * (-x.ln()).ln())
    } else {
        u.map(|x| (-x.ln()).powf(theta))
    }
}

/// `exp(-t^{1/θ})`.
pub fn psi(t: &DMatrix<f64>, theta: f64) -> DMatrix<f64> {
    let alpha = 1.0 / theta;
    t.map(|y| (-y.powf(alpha)).exp())
}

fn parity(k: i64) -> f64 {
    if k.rem_euclid(2) == 0 { 1.0 } else { -1.0 }
}

/// Sign of term `j` in the generator-derivative expansion.
fn term_sign(j: usize, alpha: f64, d: usize) -> f64 {
    if alpha == 1.0 {
        if j == d {
            1.0
        } else {
            parity((d - j) as i64)
        }
    } else {
        let x = alpha * j as f64;
        if x != x.floor() {
            parity(j as i64 - x.ceil() as i64)
        } else {
            0.0
        }
    }
}

/// `log |Σ_j s_j · |(αj)_d| · x^j / j! · Σ_{k<=d-j} x^k/k!|` with `lx = ln x`.
fn log_polyg(lx: f64, alpha: f64, d: usize) -> f64 {
    let x = lx.exp();
    let mut log_abs = Vec::with_capacity(d);
    let mut signs = Vec::with_capacity(d);
    for j in 1..=d {
        log_abs.push(
            log_abs_falling_factorial(alpha * j as f64, d) + j as f64 * lx
                - log_factorial(j as u64)
                + log_exp_partial_sum((d - j) as u64, x),
        );
        signs.push(term_sign(j, alpha, d));
    }
    log_signed_sum_exp(&log_abs, &signs)
}

fn log_pdf_row(row: &[f64], theta: f64) -> f64 {
    let d = row.len();
    let alpha = 1.0 / theta;

    // ln(-ln u) is reused for ln t and for the Jacobian term.
    let llu: Vec<f64> = row.iter().map(|u| (-u.ln()).ln()).collect();
    let lnt = log_sum_exp(&llu.iter().map(|l| theta * l).collect::<Vec<_>>());
    let lx = alpha * lnt;

    let ls = log_polyg(lx, alpha, d) - d as f64 * lx / alpha;
    let jacobian: f64 = row
        .iter()
        .zip(&llu)
        .map(|(u, l)| (theta - 1.0) * l - u.ln())
        .sum();

    -lx.exp() + d as f64 * theta.ln() + jacobian + ls
}

/// Joint density at each row.
///
/// # Errors
/// `CopulaError::Parameter` for θ < 1 or non-finite θ.
pub fn pdf(obs: &PseudoObservations, theta: f64, log: bool) -> Result<Vec<f64>, CopulaError> {
    require_finite(Family::Gumbel, theta)?;
    if theta < 1.0 {
        return Err(CopulaError::Parameter {
            family: Family::Gumbel.display_name(),
            theta,
            reason: "theta must be >= 1",
        });
    }
    Ok(to_scale(map_rows(obs, |row| log_pdf_row(row, theta)), log))
}

/// Density of the diagonal statistic: `d^α · y^{d^α - 1}`, α = 1/θ.
///
/// # Errors
/// `CopulaError::Parameter` for θ <= 0 or non-finite θ.
pub fn diag_pdf(obs: &PseudoObservations, theta: f64, log: bool) -> Result<Vec<f64>, CopulaError> {
    require_finite(Family::Gumbel, theta)?;
    if theta <= 0.0 {
        return Err(CopulaError::Parameter {
            family: Family::Gumbel.display_name(),
            theta,
            reason: "theta must be positive",
        });
    }
    let alpha = 1.0 / theta;
    let d = obs.n_dims() as f64;
    let da = d.powf(alpha);
    let values = map_rows(obs, |row| {
        let y = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (da - 1.0) * y.ln() + alpha * d.ln()
    });
    Ok(to_scale(values, log))
}

/// Closed-form diagonal estimator
/// `max(1, ln d / (ln n - ln Σ(-ln y)))`.
///
/// `Ok(None)` when the estimate is not finite.
///
/// # Errors
/// `CopulaError::Domain` if the log-sum is undefined.
pub fn try_dmle(obs: &PseudoObservations) -> Result<Option<f64>, CopulaError> {
    let neg_log_y: Vec<f64> = diagonal(obs).iter().map(|y| -y.ln()).collect();
    let ls = log_sum(&neg_log_y)?;
    let n = obs.n_obs() as f64;
    let d = obs.n_dims() as f64;
    let theta = (d.ln() / (n.ln() - ls)).max(1.0);
    Ok(theta.is_finite().then_some(theta))
}

/// [`try_dmle`] with the NaN sentinel.
pub fn dmle(obs: &PseudoObservations) -> f64 {
    match try_dmle(obs) {
        Ok(Some(theta)) => theta,
        Ok(None) => {
            log::warn!("Gumbel diagonal estimate is not finite");
            f64::NAN
        }
        Err(err) => {
            log::warn!("Gumbel diagonal estimate undefined: {err}");
            f64::NAN
        }
    }
}
