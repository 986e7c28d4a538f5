//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during estimation
//! - exported to JSON (fitted-parameter summary)
//! - selected from the command line

use std::path::PathBuf;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::CopulaError;
use crate::fit::DmleOptions;

/// Archimedean copula family.
///
/// Per-family behaviour (generator, densities, estimator) is dispatched by
/// matching on this tag; see `crate::copula`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Clayton,
    Frank,
    Gumbel,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Clayton, Family::Frank, Family::Gumbel];

    pub fn display_name(self) -> &'static str {
        match self {
            Family::Clayton => "Clayton",
            Family::Frank => "Frank",
            Family::Gumbel => "Gumbel",
        }
    }

    /// θ at which the family reduces to the independence copula.
    pub fn independence_theta(self) -> f64 {
        match self {
            Family::Clayton | Family::Frank => 0.0,
            Family::Gumbel => 1.0,
        }
    }

    /// Feasible θ interval searched by the numerical estimator.
    ///
    /// Gumbel has a closed-form estimator and no search interval.
    pub fn search_bounds(self) -> Option<(f64, f64)> {
        match self {
            Family::Clayton => Some((1e-14, 1000.0)),
            Family::Frank => Some((1e-14, 745.0)),
            Family::Gumbel => None,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which families to fit.
///
/// `All` fits every family and selects the best one by BIC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FamilySpec {
    Clayton,
    Frank,
    Gumbel,
    All,
}

impl FamilySpec {
    pub fn families(self) -> Vec<Family> {
        match self {
            FamilySpec::Clayton => vec![Family::Clayton],
            FamilySpec::Frank => vec![Family::Frank],
            FamilySpec::Gumbel => vec![Family::Gumbel],
            FamilySpec::All => Family::ALL.to_vec(),
        }
    }
}

/// An n×d matrix of pseudo-observations: one row per peak, one column per
/// replicate, every entry strictly inside (0, 1).
///
/// The invariant is checked once on construction, so the density and
/// estimation routines never see a 0 or a 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoObservations {
    values: DMatrix<f64>,
}

impl PseudoObservations {
    /// Validate and wrap a matrix.
    ///
    /// # Errors
    /// - `CopulaError::Shape` for an empty matrix or fewer than two columns.
    /// - `CopulaError::Domain` for any entry outside the open unit interval.
    pub fn new(values: DMatrix<f64>) -> Result<Self, CopulaError> {
        if values.nrows() == 0 {
            return Err(CopulaError::shape("no observations (0 rows)"));
        }
        if values.ncols() < 2 {
            return Err(CopulaError::shape(format!(
                "need at least 2 replicate columns, got {}",
                values.ncols()
            )));
        }
        for i in 0..values.nrows() {
            for j in 0..values.ncols() {
                let v = values[(i, j)];
                if !(v > 0.0 && v < 1.0) {
                    return Err(CopulaError::domain(format!(
                        "pseudo-observation at row {i}, column {j} is {v}; must lie strictly inside (0, 1)"
                    )));
                }
            }
        }
        Ok(Self { values })
    }

    /// Build from row vectors.
    ///
    /// # Errors
    /// `CopulaError::Shape` for ragged rows, plus everything [`Self::new`] checks.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, CopulaError> {
        let n = rows.len();
        let d = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != d) {
            return Err(CopulaError::shape(format!(
                "row {i} has {} columns, expected {d}",
                r.len()
            )));
        }
        let flat: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Self::new(DMatrix::from_row_slice(n, d, &flat))
    }

    pub fn n_obs(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_dims(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Copy of row `i`.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.values.row(i).iter().copied().collect()
    }

    pub fn into_inner(self) -> DMatrix<f64> {
        self.values
    }
}

/// Where the input matrix comes from and how to read it.
#[derive(Debug, Clone)]
pub struct InputConfig {
    pub path: PathBuf,
    pub delimiter: u8,
    /// Rank-transform raw scores into pseudo-observations before fitting.
    pub ranks: bool,
}

/// Configuration of `midr fit`.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: InputConfig,
    pub family_spec: FamilySpec,
    pub dmle: DmleOptions,
    pub summary: Option<PathBuf>,
}

/// Configuration of `midr density`.
#[derive(Debug, Clone)]
pub struct DensityConfig {
    pub input: InputConfig,
    pub family: Family,
    /// Estimated by diagonal MLE when absent.
    pub theta: Option<f64>,
    pub log: bool,
    pub dmle: DmleOptions,
    pub output: Option<PathBuf>,
}

/// Configuration of `midr simulate`.
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    pub family: Family,
    pub theta: f64,
    pub rows: usize,
    pub dims: usize,
    pub seed: u64,
    pub output: Option<PathBuf>,
}

/// Fit of a single family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyFit {
    pub family: Family,
    pub theta: f64,
    /// Σ log diag_pdf at θ (the objective maximised by DMLE).
    pub diag_loglik: f64,
    /// Σ log pdf at θ (full joint likelihood).
    pub loglik: f64,
    /// BIC = -2 loglik + ln(n), one parameter per family.
    pub bic: f64,
}

/// Fitted-parameter summary written next to the per-replicate outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitSummary {
    pub tool: String,
    pub generated_at: DateTime<Local>,
    pub n_obs: usize,
    pub n_dims: usize,
    pub ranked: bool,
    pub fits: Vec<FamilyFit>,
    pub best: Option<Family>,
    /// Families that could not be estimated, with the reason.
    pub skipped: Vec<(Family, String)>,
}
