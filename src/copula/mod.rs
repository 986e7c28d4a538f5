//! Archimedean copula families.
//!
//! Every family implements the same five operations over a pseudo-observation
//! matrix `U` (n×d) and a scalar dependence parameter θ:
//!
//! - `ipsi(U, θ)`: elementwise inverse generator
//! - `psi(T, θ)`: elementwise generator
//! - `pdf(U, θ)`: joint copula density per row
//! - `diag_pdf(U, θ)`: density of the diagonal statistic `y = max(row)` per row
//! - `dmle(U)`: θ maximising the diagonal likelihood (NaN if it cannot be estimated)
//!
//! Families are implemented as small, pure functions in their own modules and
//! dispatched here by matching on [`Family`].

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{Family, PseudoObservations};
use crate::error::CopulaError;
use crate::fit::DmleOptions;

pub mod clayton;
pub mod frank;
pub mod gumbel;

impl Family {
    /// Elementwise inverse generator `ψ⁻¹(u; θ)` (log-scale when `log` is set).
    pub fn ipsi(self, u: &DMatrix<f64>, theta: f64, log: bool) -> DMatrix<f64> {
        match self {
            Family::Clayton => clayton::ipsi(u, theta, log),
            Family::Frank => frank::ipsi(u, theta, log),
            Family::Gumbel => gumbel::ipsi(u, theta, log),
        }
    }

    /// Elementwise generator `ψ(t; θ)`.
    pub fn psi(self, t: &DMatrix<f64>, theta: f64) -> DMatrix<f64> {
        match self {
            Family::Clayton => clayton::psi(t, theta),
            Family::Frank => frank::psi(t, theta),
            Family::Gumbel => gumbel::psi(t, theta),
        }
    }

    /// Joint copula density at each row of `obs`.
    pub fn pdf(self, obs: &PseudoObservations, theta: f64, log: bool) -> Result<Vec<f64>, CopulaError> {
        match self {
            Family::Clayton => clayton::pdf(obs, theta, log),
            Family::Frank => frank::pdf(obs, theta, log),
            Family::Gumbel => gumbel::pdf(obs, theta, log),
        }
    }

    /// Density of the diagonal statistic at each row of `obs`.
    pub fn diag_pdf(
        self,
        obs: &PseudoObservations,
        theta: f64,
        log: bool,
    ) -> Result<Vec<f64>, CopulaError> {
        match self {
            Family::Clayton => clayton::diag_pdf(obs, theta, log),
            Family::Frank => frank::diag_pdf(obs, theta, log),
            Family::Gumbel => gumbel::diag_pdf(obs, theta, log),
        }
    }

    /// Diagonal maximum-likelihood estimate of θ with default options.
    ///
    /// Returns NaN when θ could not be estimated; callers must check.
    pub fn dmle(self, obs: &PseudoObservations) -> f64 {
        self.dmle_with(obs, &DmleOptions::default())
    }

    /// Diagonal maximum-likelihood estimate of θ.
    pub fn dmle_with(self, obs: &PseudoObservations, opts: &DmleOptions) -> f64 {
        match self {
            Family::Clayton => clayton::dmle(obs, opts),
            Family::Frank => frank::dmle(obs, opts),
            Family::Gumbel => gumbel::dmle(obs),
        }
    }

    /// Typed variant of [`Family::dmle_with`]: `Ok(None)` when the estimate
    /// did not converge.
    pub fn try_dmle(
        self,
        obs: &PseudoObservations,
        opts: &DmleOptions,
    ) -> Result<Option<f64>, CopulaError> {
        match self {
            Family::Clayton | Family::Frank => crate::fit::dmle::minimize_diagonal(self, obs, opts),
            Family::Gumbel => gumbel::try_dmle(obs),
        }
    }
}

/// Diagonal statistic: the maximum of each row.
pub fn diagonal(obs: &PseudoObservations) -> Vec<f64> {
    let u = obs.values();
    (0..u.nrows())
        .map(|i| u.row(i).iter().copied().fold(f64::NEG_INFINITY, f64::max))
        .collect()
}

/// Apply a per-row function in parallel, keeping row order.
///
/// Each worker copies rows into one reused buffer, so the matrix is never
/// cloned row by row.
pub(crate) fn map_rows<F>(obs: &PseudoObservations, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64 + Sync + Send,
{
    let u = obs.values();
    let d = obs.n_dims();
    (0..obs.n_obs())
        .into_par_iter()
        .map_init(
            || Vec::with_capacity(d),
            |buf, i| {
                fill_row(u, i, buf);
                f(buf)
            },
        )
        .collect()
}

/// Overwrite `buf` with row `i` of `u`.
pub(crate) fn fill_row(u: &DMatrix<f64>, i: usize, buf: &mut Vec<f64>) {
    buf.clear();
    buf.extend(u.row(i).iter().copied());
}

/// Map a log-density vector to the requested scale.
pub(crate) fn to_scale(log_values: Vec<f64>, log: bool) -> Vec<f64> {
    if log {
        log_values
    } else {
        log_values.into_iter().map(f64::exp).collect()
    }
}

pub(crate) fn require_finite(family: Family, theta: f64) -> Result<(), CopulaError> {
    if theta.is_finite() {
        Ok(())
    } else {
        Err(CopulaError::Parameter {
            family: family.display_name(),
            theta,
            reason: "theta must be finite",
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_is_row_max() {
        let obs = PseudoObservations::from_rows(&[
            vec![0.72122885, 0.64249391, 0.6771109],
            vec![0.87942847, 0.15136347, 0.91851515],
        ])
        .unwrap();
        assert_eq!(diagonal(&obs), vec![0.72122885, 0.91851515]);
    }

    #[test]
    fn map_rows_keeps_order() {
        let rows: Vec<Vec<f64>> = (1..200).map(|i| vec![i as f64 / 200.0, 0.5]).collect();
        let obs = PseudoObservations::from_rows(&rows).unwrap();
        let firsts = map_rows(&obs, |r| r[0]);
        for (i, v) in firsts.iter().enumerate() {
            assert_eq!(*v, (i + 1) as f64 / 200.0);
        }
    }

    #[test]
    fn fill_row_reuses_the_buffer() {
        let obs = PseudoObservations::from_rows(&[vec![0.2, 0.3, 0.9], vec![0.4, 0.5, 0.6]]).unwrap();
        let mut buf = vec![7.0; 8];
        fill_row(obs.values(), 1, &mut buf);
        assert_eq!(buf, vec![0.4, 0.5, 0.6]);
        assert!(buf.capacity() >= 8);
    }

    #[test]
    fn dispatch_reaches_every_family() {
        let obs = PseudoObservations::from_rows(&[vec![0.3, 0.6], vec![0.8, 0.7]]).unwrap();
        for family in Family::ALL {
            let theta = family.independence_theta();
            let dens = family.pdf(&obs, theta, false).unwrap();
            for v in dens {
                assert!((v - 1.0).abs() < 1e-12, "{family}: {v}");
            }
        }
    }
}
