//! Diagonal maximum-likelihood estimation for Clayton and Frank.
//!
//! The objective is `Σ -log diag_pdf(y_i; θ)` over the feasible interval of
//! the family. Estimation runs in two stages:
//!
//! 1. scan a log-spaced θ grid (parallel, deterministic tie-break)
//! 2. refine with a bounded Brent search between the best point's neighbours
//!
//! A run that does not converge yields NaN from [`estimate`] and `Ok(None)`
//! from [`minimize_diagonal`].

use argmin::core::{CostFunction, Error as ArgminError, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::brent::BrentOpt;
use rayon::prelude::*;

use crate::domain::{Family, PseudoObservations};
use crate::error::CopulaError;
use crate::fit::grid::{bracket, log_space};

/// Optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DmleOptions {
    /// Absolute Brent tolerance on θ.
    pub tolerance: f64,
    pub max_iters: u64,
    pub grid_steps: usize,
}

impl Default for DmleOptions {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iters: 200,
            grid_steps: 48,
        }
    }
}

/// `Σ log diag_pdf(y_i; θ)`.
pub fn diag_loglik(family: Family, obs: &PseudoObservations, theta: f64) -> Result<f64, CopulaError> {
    Ok(family.diag_pdf(obs, theta, true)?.iter().sum())
}

struct NegDiagLoglik<'a> {
    family: Family,
    obs: &'a PseudoObservations,
}

impl CostFunction for NegDiagLoglik<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, theta: &f64) -> Result<f64, ArgminError> {
        let value = -diag_loglik(self.family, self.obs, *theta)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(CopulaError::domain(format!(
                "diagonal likelihood is not finite at theta={theta}"
            ))
            .into())
        }
    }
}

/// Grid scan plus Brent refinement.
///
/// Returns `Ok(None)` when no grid point has a finite objective or when Brent
/// stops without converging.
///
/// # Errors
/// - `CopulaError::Parameter` for a family without a search interval.
/// - `CopulaError::Optimizer` if the solver raises at runtime.
pub fn minimize_diagonal(
    family: Family,
    obs: &PseudoObservations,
    opts: &DmleOptions,
) -> Result<Option<f64>, CopulaError> {
    let (lower, upper) = family.search_bounds().ok_or(CopulaError::Parameter {
        family: family.display_name(),
        theta: f64::NAN,
        reason: "family has no numerical search interval",
    })?;
    let grid = log_space(lower, upper, opts.grid_steps)?;

    let costs: Vec<f64> = grid
        .par_iter()
        .map(|&theta| match diag_loglik(family, obs, theta) {
            Ok(ll) if ll.is_finite() => -ll,
            _ => f64::INFINITY,
        })
        .collect();

    // Deterministic selection: minimum cost, ties broken by grid index.
    let mut best_idx = 0;
    for (idx, &c) in costs.iter().enumerate() {
        if c < costs[best_idx] {
            best_idx = idx;
        }
    }
    if !costs[best_idx].is_finite() {
        log::warn!("{family}: diagonal likelihood not finite anywhere on the theta grid");
        return Ok(None);
    }

    let (lo, hi) = bracket(&grid, best_idx);
    log::debug!(
        "{family}: grid best theta={:.6e} (cost {:.6}), bracket [{lo:.6e}, {hi:.6e}]",
        grid[best_idx],
        costs[best_idx]
    );

    let problem = NegDiagLoglik { family, obs };
    let solver = BrentOpt::new(lo, hi).set_tolerance(f64::EPSILON.sqrt(), opts.tolerance);
    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(opts.max_iters))
        .run()
        .map_err(|err| CopulaError::Optimizer(format!("{family}: {err}")))?;

    let state = result.state();
    log::debug!(
        "{family}: brent stopped after {} iterations ({:?})",
        state.get_iter(),
        state.get_termination_status()
    );
    match state.get_termination_status() {
        TerminationStatus::Terminated(TerminationReason::SolverConverged) => {
            Ok(state.get_best_param().copied().filter(|t| t.is_finite()))
        }
        _ => Ok(None),
    }
}

/// [`minimize_diagonal`] behind the NaN sentinel.
pub fn estimate(family: Family, obs: &PseudoObservations, opts: &DmleOptions) -> f64 {
    match minimize_diagonal(family, obs, opts) {
        Ok(Some(theta)) => theta,
        Ok(None) => {
            log::warn!("{family}: diagonal MLE did not converge");
            f64::NAN
        }
        Err(err) => {
            log::warn!("{family}: diagonal MLE failed: {err}");
            f64::NAN
        }
    }
}
