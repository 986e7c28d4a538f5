//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs the logger
//! - parses CLI arguments and resolves environment defaults
//! - sizes the worker pool
//! - dispatches to the pipeline and prints/writes the results

use std::path::Path;
use std::str::FromStr;

use clap::Parser;

use crate::cli::{Cli, Command, DensityArgs, EstimatorArgs, FitArgs, InputArgs, SimulateArgs};
use crate::domain::{DensityConfig, FitConfig, InputConfig, SimulateConfig};
use crate::error::AppError;
use crate::fit::DmleOptions;
use crate::io::ingest::infer_delimiter;

pub mod pipeline;

/// Entry point for the `midr` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_logging(cli.verbose);
    init_thread_pool(cli.threads)?;

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Density(args) => handle_density(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    println!("{}", crate::report::format_fit_summary(&run.summary));

    if let Some(path) = &config.summary {
        crate::io::export::write_summary_json(path, &run.summary)?;
    }
    Ok(())
}

fn handle_density(args: DensityArgs) -> Result<(), AppError> {
    let config = density_config_from_args(&args)?;
    let out = pipeline::run_density(&config)?;

    if out.estimated {
        eprintln!("{}: theta={:.6} (diagonal MLE)", config.family, out.theta);
    }
    let sink = crate::io::export::output_sink(config.output.as_deref())?;
    crate::io::export::write_densities(sink, &out.rows, config.log)
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = SimulateConfig {
        family: args.family,
        theta: args.theta,
        rows: args.rows,
        dims: args.dims,
        seed: args.seed,
        output: args.output,
    };
    let obs = pipeline::run_simulate(&config)?;
    let sink = crate::io::export::output_sink(config.output.as_deref())?;
    crate::io::export::write_matrix(sink, &obs)
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    Ok(FitConfig {
        input: input_config_from_args(&args.input)?,
        family_spec: args.family,
        dmle: dmle_options_from_args(&args.estimator)?,
        summary: args.summary.clone(),
    })
}

pub fn density_config_from_args(args: &DensityArgs) -> Result<DensityConfig, AppError> {
    if let Some(theta) = args.theta.filter(|t| !t.is_finite()) {
        return Err(AppError::new(2, format!("Invalid --theta {theta}.")));
    }
    Ok(DensityConfig {
        input: input_config_from_args(&args.input)?,
        family: args.family,
        theta: args.theta,
        log: args.log,
        dmle: dmle_options_from_args(&args.estimator)?,
        output: args.output.clone(),
    })
}

fn input_config_from_args(args: &InputArgs) -> Result<InputConfig, AppError> {
    let delimiter = match args.delimiter {
        Some(c) if c.is_ascii() => c as u8,
        Some(c) => {
            return Err(AppError::new(2, format!("Delimiter '{c}' must be a single ASCII character.")));
        }
        None => infer_delimiter(Path::new(&args.input)),
    };
    Ok(InputConfig {
        path: args.input.clone(),
        delimiter,
        ranks: args.ranks,
    })
}

/// CLI flag, then environment variable, then the built-in default.
fn dmle_options_from_args(args: &EstimatorArgs) -> Result<DmleOptions, AppError> {
    let defaults = DmleOptions::default();
    let tolerance = match args.tolerance {
        Some(t) => t,
        None => env_value::<f64>("MIDR_TOLERANCE")?.unwrap_or(defaults.tolerance),
    };
    let max_iters = match args.max_iters {
        Some(n) => n,
        None => env_value::<u64>("MIDR_MAX_ITERS")?.unwrap_or(defaults.max_iters),
    };

    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(AppError::new(2, format!("Invalid tolerance {tolerance} (must be > 0).")));
    }
    if max_iters == 0 {
        return Err(AppError::new(2, "max-iters must be >= 1."));
    }
    if args.grid_steps < 3 {
        return Err(AppError::new(2, "grid-steps must be >= 3."));
    }

    Ok(DmleOptions {
        tolerance,
        max_iters,
        grid_steps: args.grid_steps,
    })
}

/// Parse an optional environment variable.
fn env_value<T: FromStr>(name: &str) -> Result<Option<T>, AppError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::new(2, format!("Invalid {name}='{raw}' in environment (.env)."))),
        Err(_) => Ok(None),
    }
}

/// `-v` flags win over `MIDR_LOG`; the default level is `warn`.
fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::new().filter_or("MIDR_LOG", "warn"),
    );
    let level = match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    // A second init (e.g. from tests) is harmless.
    builder.try_init().ok();
}

fn init_thread_pool(threads: Option<usize>) -> Result<(), AppError> {
    let threads = match threads {
        Some(n) => Some(n),
        None => env_value::<usize>("MIDR_THREADS")?,
    };
    let Some(threads) = threads else {
        return Ok(());
    };
    if threads == 0 {
        return Err(AppError::new(2, "Thread count must be >= 1."));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| AppError::new(2, format!("Failed to configure {threads} worker threads: {e}")))?;
    log::debug!("using {threads} worker threads");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator(tolerance: Option<f64>, grid_steps: usize) -> EstimatorArgs {
        EstimatorArgs {
            tolerance,
            max_iters: Some(50),
            grid_steps,
        }
    }

    #[test]
    fn cli_flags_override_defaults() {
        let opts = dmle_options_from_args(&estimator(Some(1e-6), 20)).unwrap();
        assert_eq!(opts.tolerance, 1e-6);
        assert_eq!(opts.max_iters, 50);
        assert_eq!(opts.grid_steps, 20);
    }

    #[test]
    fn invalid_estimator_settings_are_rejected() {
        assert_eq!(
            dmle_options_from_args(&estimator(Some(-1.0), 20)).unwrap_err().exit_code(),
            2
        );
        assert_eq!(
            dmle_options_from_args(&estimator(Some(1e-6), 2)).unwrap_err().exit_code(),
            2
        );
    }

    #[test]
    fn delimiter_is_inferred_from_extension() {
        let args = InputArgs {
            input: "scores.tsv".into(),
            delimiter: None,
            ranks: false,
        };
        assert_eq!(input_config_from_args(&args).unwrap().delimiter, b'\t');

        let args = InputArgs {
            delimiter: Some(';'),
            ..args
        };
        assert_eq!(input_config_from_args(&args).unwrap().delimiter, b';');
    }
}
