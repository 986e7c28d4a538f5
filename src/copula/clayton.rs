//! Clayton family.
//!
//! Generator `ψ(t) = (1 + t)^{-1/θ}` for θ > 0, with the negative-θ branch
//! `max(1 - t, 0)^{-1/θ}` and the independence limit at θ = 0.

use nalgebra::DMatrix;

use crate::copula::{map_rows, require_finite, to_scale};
use crate::domain::{Family, PseudoObservations};
use crate::error::CopulaError;
use crate::fit::{self, DmleOptions};
use crate::math::{log1mexp, log1pexp, log_sum_exp};

/// Sign with `sign(0) = 0` (the generator switches branch on it).
fn sign(theta: f64) -> f64 {
    if theta > 0.0 {
        1.0
    } else if theta < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// `ln(sign(θ)·(x^{-θ} - 1))` without forming `x^{-θ}`.
///
/// With `a = -θ ln x`: for θ > 0, `a > 0` and the value is `a + ln(1 - e^{-a})`;
/// for θ < 0, `a < 0` and the value is `ln(1 - e^{a})`.
fn log_ipsi_value(x: f64, theta: f64) -> f64 {
    let a = -theta * x.ln();
    if theta > 0.0 {
        a + log1mexp(a)
    } else {
        log1mexp(-a)
    }
}

/// `sign(θ)·(x^{-θ} - 1)`, or its log.
///
/// At θ = 0 the independence generator `-ln x` is used. The log form stays
/// finite for `x` near 0 even when `x^{-θ}` overflows.
pub fn ipsi(u: &DMatrix<f64>, theta: f64, log: bool) -> DMatrix<f64> {
    u.map(|x| {
        if theta == 0.0 {
            let v = -x.ln();
            return if log { v.ln() } else { v };
        }
        if log {
            log_ipsi_value(x, theta)
        } else {
            // x^{-θ} - 1 = expm1(-θ ln x)
            sign(theta) * (-theta * x.ln()).exp_m1()
        }
    })
}

/// `max(1 + sign(θ)·t, 0)^{-1/θ}`.
pub fn psi(t: &DMatrix<f64>, theta: f64) -> DMatrix<f64> {
    t.map(|y| {
        if theta == 0.0 {
            return (-y).exp();
        }
        (1.0 + sign(theta) * y).max(0.0).powf(-1.0 / theta)
    })
}

fn log_pdf_row(row: &[f64], theta: f64) -> f64 {
    let d = row.len() as f64;
    let lu: f64 = row.iter().map(|x| x.ln()).sum();

    if theta < 0.0 {
        let t: f64 = row.iter().map(|&x| -(-theta * x.ln()).exp_m1()).sum();
        if t < 1.0 {
            theta.ln_1p() - (1.0 + theta) * lu - (d + 1.0 / theta) * (-t).ln_1p()
        } else {
            f64::NEG_INFINITY
        }
    } else {
        // ln(1 + t) from ln t, so large generator values do not overflow.
        let log_terms: Vec<f64> = row.iter().map(|&x| log_ipsi_value(x, theta)).collect();
        let log1p_t = log1pexp(log_sum_exp(&log_terms));
        let lead: f64 = (1..row.len()).map(|i| (i as f64 * theta).ln_1p()).sum();
        lead - (1.0 + theta) * lu - (d + 1.0 / theta) * log1p_t
    }
}

/// Joint density at each row.
///
/// For θ < 0 rows outside the support (`Σ ipsi >= 1`) have density 0
/// (log-density `-inf`).
///
/// # Errors
/// `CopulaError::Parameter` for non-finite θ or θ <= -1.
pub fn pdf(obs: &PseudoObservations, theta: f64, log: bool) -> Result<Vec<f64>, CopulaError> {
    require_finite(Family::Clayton, theta)?;
    if theta <= -1.0 {
        return Err(CopulaError::Parameter {
            family: Family::Clayton.display_name(),
            theta,
            reason: "theta must be > -1",
        });
    }
    if theta == 0.0 {
        return Ok(vec![if log { 0.0 } else { 1.0 }; obs.n_obs()]);
    }
    Ok(to_scale(map_rows(obs, |row| log_pdf_row(row, theta)), log))
}

fn log_diag_value(y: f64, d: usize, theta: f64) -> f64 {
    let df = d as f64;
    if theta == 0.0 {
        return df.ln() + (df - 1.0) * y.ln();
    }
    // 1 + (d-1)(1 - y^θ), via log1p of (d-1)·(-expm1(θ ln y)).
    let arg = (df - 1.0) * -(theta * y.ln()).exp_m1();
    if arg <= -1.0 {
        return f64::NEG_INFINITY;
    }
    df.ln() - (1.0 + 1.0 / theta) * arg.ln_1p()
}

/// Density of the diagonal statistic `y = max(row)`:
/// `d·(1 + (d-1)(1 - y^θ))^{-(1 + 1/θ)}`.
pub fn diag_pdf(obs: &PseudoObservations, theta: f64, log: bool) -> Result<Vec<f64>, CopulaError> {
    require_finite(Family::Clayton, theta)?;
    let d = obs.n_dims();
    let values = map_rows(obs, |row| {
        let y = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        log_diag_value(y, d, theta)
    });
    Ok(to_scale(values, log))
}

/// Diagonal maximum-likelihood estimate over `(1e-14, 1000)`. NaN on failure.
pub fn dmle(obs: &PseudoObservations, opts: &DmleOptions) -> f64 {
    fit::dmle::estimate(Family::Clayton, obs, opts)
}
