//! Synthetic pseudo-observations drawn from a copula family.
//!
//! Sampling uses the Marshall–Olkin frailty construction: draw a frailty `V`
//! whose Laplace transform is the generator ψ, then set
//! `U_j = ψ(E_j / V)` for independent unit exponentials `E_j`.
//!
//! - Clayton: `V ~ Gamma(1/θ, 1)`
//! - Frank: `V ~ Logarithmic(1 - e^{-θ})` (Kemp's LK algorithm)
//! - Gumbel: `V` positive stable with index `1/θ` (Kanter's representation)

use std::f64::consts::PI;

use nalgebra::DMatrix;
use rand::distributions::Open01;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{Exp1, Gamma};

use crate::domain::{Family, PseudoObservations};
use crate::error::CopulaError;

/// Draw `rows` observations of dimension `dims` from `family` at `theta`.
///
/// Samples are clamped to `[ε, 1 - ε]` so they always satisfy the
/// pseudo-observation invariant.
///
/// # Errors
/// - `CopulaError::Parameter` if θ is outside the family's sampling domain
///   (Clayton, Frank: θ > 0; Gumbel: θ >= 1).
/// - `CopulaError::Shape` if `rows == 0` or `dims < 2`.
pub fn sample(
    family: Family,
    theta: f64,
    rows: usize,
    dims: usize,
    seed: u64,
) -> Result<PseudoObservations, CopulaError> {
    check_theta(family, theta)?;
    if rows == 0 || dims < 2 {
        return Err(CopulaError::shape(format!(
            "cannot sample {rows} rows of dimension {dims}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let gamma = Gamma::new(1.0 / theta, 1.0)
        .map_err(|e| CopulaError::domain(format!("frailty distribution error: {e}")))?;

    let mut t = DMatrix::zeros(rows, dims);
    for i in 0..rows {
        let v = match family {
            Family::Clayton => gamma.sample(&mut rng),
            Family::Frank => log_series(&mut rng, theta),
            Family::Gumbel => positive_stable(&mut rng, 1.0 / theta),
        };
        for j in 0..dims {
            let e: f64 = rng.sample(Exp1);
            t[(i, j)] = e / v;
        }
    }

    let u = family
        .psi(&t, theta)
        .map(|x| x.clamp(f64::EPSILON, 1.0 - f64::EPSILON));
    PseudoObservations::new(u)
}

fn check_theta(family: Family, theta: f64) -> Result<(), CopulaError> {
    let (ok, reason) = match family {
        Family::Clayton | Family::Frank => (theta > 0.0, "sampling requires theta > 0"),
        Family::Gumbel => (theta >= 1.0, "sampling requires theta >= 1"),
    };
    if ok && theta.is_finite() {
        Ok(())
    } else {
        Err(CopulaError::Parameter {
            family: family.display_name(),
            theta,
            reason,
        })
    }
}

/// Logarithmic-series variate with parameter `p = 1 - e^{-θ}`.
fn log_series<R: Rng>(rng: &mut R, theta: f64) -> f64 {
    let p = -(-theta).exp_m1();
    let v: f64 = rng.sample(Open01);
    if v >= p {
        return 1.0;
    }
    let u2: f64 = rng.sample(Open01);
    let q = -(u2 * -theta).exp_m1();
    if v <= q * q {
        (1.0 + v.ln() / q.ln()).floor()
    } else if v <= q {
        2.0
    } else {
        1.0
    }
}

/// Positive stable variate with Laplace transform `exp(-s^α)`, `0 < α <= 1`.
fn positive_stable<R: Rng>(rng: &mut R, alpha: f64) -> f64 {
    if alpha == 1.0 {
        return 1.0;
    }
    let u: f64 = PI * rng.sample::<f64, _>(Open01);
    let w: f64 = rng.sample(Exp1);
    let a = ((alpha * u).sin().powf(alpha) * ((1.0 - alpha) * u).sin().powf(1.0 - alpha) / u.sin())
        .powf(1.0 / (1.0 - alpha));
    (a / w).powf((1.0 - alpha) / alpha)
}
