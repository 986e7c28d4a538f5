//! Command-line parsing for the `midr` copula engine.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the estimation/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::domain::{Family, FamilySpec};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "midr",
    version,
    about = "Archimedean copula fitting for replicate reproducibility"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). Overrides MIDR_LOG.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Worker threads for row-parallel evaluation (default: MIDR_THREADS or all cores).
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate θ for one or all families and select the best by BIC.
    Fit(FitArgs),
    /// Evaluate joint and diagonal densities for every row.
    Density(DensityArgs),
    /// Draw a synthetic pseudo-observation matrix.
    Simulate(SimulateArgs),
}

/// Input matrix options shared by `fit` and `density`.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Delimited matrix, one row per peak, one column per replicate.
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Field delimiter (default: tab for .tsv/.tab, comma otherwise).
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Treat the input as raw scores and rank-transform each column.
    #[arg(long)]
    pub ranks: bool,
}

/// Diagonal-MLE optimizer options.
#[derive(Debug, Args, Clone)]
pub struct EstimatorArgs {
    /// Absolute tolerance on θ for the Brent search (default: MIDR_TOLERANCE or 1e-10).
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Iteration cap for the Brent search (default: MIDR_MAX_ITERS or 200).
    #[arg(long)]
    pub max_iters: Option<u64>,

    /// Points in the log-spaced θ grid that brackets the search.
    #[arg(long, default_value_t = 48)]
    pub grid_steps: usize,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Which family (or all of them) to fit.
    #[arg(short, long, value_enum, default_value_t = FamilySpec::All)]
    pub family: FamilySpec,

    /// Write the fitted-parameter summary to JSON.
    #[arg(long, value_name = "JSON")]
    pub summary: Option<PathBuf>,

    #[command(flatten)]
    pub estimator: EstimatorArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DensityArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(short, long, value_enum)]
    pub family: Family,

    /// Dependence parameter; estimated by diagonal MLE when omitted.
    #[arg(long, allow_negative_numbers = true)]
    pub theta: Option<f64>,

    /// Report log-densities.
    #[arg(long)]
    pub log: bool,

    /// Output TSV (default: stdout).
    #[arg(short, long, value_name = "TSV")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub estimator: EstimatorArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[arg(short, long, value_enum)]
    pub family: Family,

    #[arg(long)]
    pub theta: f64,

    #[arg(short = 'n', long, default_value_t = 1000)]
    pub rows: usize,

    #[arg(short, long, default_value_t = 2)]
    pub dims: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output TSV (default: stdout).
    #[arg(short, long, value_name = "TSV")]
    pub output: Option<PathBuf>,
}
