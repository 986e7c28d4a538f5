//! Frank family.
//!
//! `ψ⁻¹(u) = -ln((e^{-uθ} - 1) / (e^{-θ} - 1))`. The generator, its inverse
//! and the diagonal density are each split into magnitude branches; the
//! thresholds below are part of the numerical contract.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::copula::{fill_row, map_rows, require_finite, to_scale};
use crate::domain::{Family, PseudoObservations};
use crate::error::CopulaError;
use crate::fit::{self, DmleOptions};
use crate::math::{log1mexp, log1pexp, polylog_log_z};

fn ipsi_value(x: f64, theta: f64) -> f64 {
    if theta == 0.0 {
        return -x.ln();
    }
    if x <= 0.01 * theta.abs() {
        -((-x * theta).exp_m1() / (-theta).exp_m1()).ln()
    } else if (-theta).exp() > 0.0 && (theta - x * theta).abs() < 0.5 {
        -((-theta).exp() * (theta - x * theta).exp_m1() / (-theta).exp_m1()).ln_1p()
    } else {
        -(((-x * theta).exp() - (-theta).exp()) / (-theta).exp_m1()).ln_1p()
    }
}

/// Elementwise inverse generator (log-scale when `log` is set).
pub fn ipsi(u: &DMatrix<f64>, theta: f64, log: bool) -> DMatrix<f64> {
    u.map(|x| {
        let v = ipsi_value(x, theta);
        if log { v.ln() } else { v }
    })
}

/// Elementwise generator, defined for every real θ.
pub fn psi(t: &DMatrix<f64>, theta: f64) -> DMatrix<f64> {
    if theta > 0.0 {
        let shift = log1mexp(theta);
        t.map(|y| -log1mexp(y - shift) / theta)
    } else if theta == 0.0 {
        t.map(|y| (-y).exp())
    } else if theta < f64::EPSILON.ln() {
        // e^{-θ} overflows the general form.
        t.map(|y| -log1pexp(-(y + theta)) / theta)
    } else {
        t.map(|y| -((-y).exp() * (-theta).exp_m1()).ln_1p() / theta)
    }
}

fn require_non_negative(theta: f64) -> Result<(), CopulaError> {
    require_finite(Family::Frank, theta)?;
    if theta < 0.0 {
        return Err(CopulaError::Parameter {
            family: Family::Frank.display_name(),
            theta,
            reason: "density requires theta >= 0",
        });
    }
    Ok(())
}

/// Largest θ for which `e^{-θ}` is still representable; above it the
/// polylog argument rounds to 1.
const MAX_DENSITY_THETA: f64 = 745.0;

/// Joint density at each row, through `Li_{-(d-1)}`.
///
/// The polylog argument `(1 - e^{-θ}) · Π (1 - e^{-θu_i}) / (1 - e^{-θ})` is
/// formed in log space and the whole batch is evaluated in one call.
///
/// # Errors
/// `CopulaError::Parameter` for θ < 0, θ > 745 or non-finite θ.
pub fn pdf(obs: &PseudoObservations, theta: f64, log: bool) -> Result<Vec<f64>, CopulaError> {
    require_non_negative(theta)?;
    if theta > MAX_DENSITY_THETA {
        return Err(CopulaError::Parameter {
            family: Family::Frank.display_name(),
            theta,
            reason: "density requires theta <= 745",
        });
    }
    if theta == 0.0 {
        return Ok(vec![if log { 0.0 } else { 1.0 }; obs.n_obs()]);
    }

    let u = obs.values();
    let d = obs.n_dims();
    let lp = log1mexp(theta);
    let lead = (d as f64 - 1.0) * theta.ln();

    let (log_args, rest): (Vec<f64>, Vec<f64>) = (0..obs.n_obs())
        .into_par_iter()
        .map_init(
            || Vec::with_capacity(d),
            |row, i| {
                fill_row(u, i, row);
                let lpu: Vec<f64> = row.iter().map(|&x| log1mexp(theta * x)).collect();
                let log_arg = lp + lpu.iter().map(|l| l - lp).sum::<f64>();
                let rest = lead - theta * row.iter().sum::<f64>() - lpu.iter().sum::<f64>();
                (log_arg, rest)
            },
        )
        .unzip();

    let li = polylog_log_z(&log_args, -(d as i32 - 1))?;
    let values = li.iter().zip(&rest).map(|(l, r)| l + r).collect();
    Ok(to_scale(values, log))
}

/// Log diagonal density at `y` for `x = yθ > 0`.
fn log_diag_value(y: f64, d: usize, theta: f64) -> f64 {
    let df = d as f64;
    if theta == 0.0 {
        return df.ln() + (df - 1.0) * y.ln();
    }
    let x = y * theta;

    if x < 0.1 {
        let h = -(-theta).exp_m1();
        let ie = -(-x).exp_m1();
        let res = (h / ie).powf(df - 1.0) - ie;
        return df.ln() - x - res.ln();
    }

    let ep = ((-x).exp() - (x - theta).exp()) / -(-x).exp_m1();
    let delt = (-x).exp() * (1.0 + ep);
    let dcom = df + (df - 1.0) * ep;
    let dcom_time = (1.0 + ep) * delt;
    let pair = (df - 1.0) * (df - 2.0) / 2.0;

    let series = if x > 25.0 {
        1.0 + (df - 3.0) / 3.0 * delt
    } else {
        1.0 + (df - 3.0) / 3.0 * delt * (1.0 + (df - 4.0) / 4.0 * delt * (1.0 + (df - 5.0) / 5.0 * delt))
    };
    let res = pair * series * dcom_time + dcom;
    df.ln() - res.ln()
}

/// Density of the diagonal statistic, with three branches on `yθ`
/// (`< 0.1`, `> 25`, and in between).
///
/// # Errors
/// `CopulaError::Parameter` for θ < 0 or non-finite θ.
pub fn diag_pdf(obs: &PseudoObservations, theta: f64, log: bool) -> Result<Vec<f64>, CopulaError> {
    require_non_negative(theta)?;
    let d = obs.n_dims();
    let values = map_rows(obs, |row| {
        let y = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        log_diag_value(y, d, theta)
    });
    Ok(to_scale(values, log))
}

/// Diagonal maximum-likelihood estimate over `(1e-14, 745)`. NaN on failure.
pub fn dmle(obs: &PseudoObservations, opts: &DmleOptions) -> f64 {
    fit::dmle::estimate(Family::Frank, obs, opts)
}
