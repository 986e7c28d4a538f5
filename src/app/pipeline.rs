//! Shared pipeline logic behind the `midr` subcommands.
//!
//! ingest -> (rank transform) -> validation -> estimation / densities / sampling
//!
//! The command handlers in `app` only deal with presentation and output paths.

use chrono::Local;

use crate::copula::diagonal;
use crate::data::{pseudo_observations, sample};
use crate::domain::{DensityConfig, FitConfig, FitSummary, InputConfig, PseudoObservations, SimulateConfig};
use crate::error::AppError;
use crate::fit::selection::{fit_and_select, FitSelection};
use crate::io::export::DensityRow;
use crate::io::ingest::load_matrix;

/// All computed outputs of a single `midr fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub selection: FitSelection,
    pub summary: FitSummary,
}

/// Outputs of `midr density`.
#[derive(Debug, Clone)]
pub struct DensityOutput {
    pub theta: f64,
    /// Whether θ came from diagonal MLE rather than the command line.
    pub estimated: bool,
    pub rows: Vec<DensityRow>,
}

/// Read the input matrix and turn it into validated pseudo-observations.
pub fn load_observations(input: &InputConfig) -> Result<PseudoObservations, AppError> {
    let matrix = load_matrix(&input.path, input.delimiter)?;
    log::info!(
        "read {} x {} matrix from {}",
        matrix.values.nrows(),
        matrix.values.ncols(),
        input.path.display()
    );
    let obs = if input.ranks {
        pseudo_observations(&matrix.values)?
    } else {
        PseudoObservations::new(matrix.values).map_err(|e| {
            AppError::new(
                2,
                format!("{e}. Pass --ranks to rank-transform raw scores."),
            )
        })?
    };
    Ok(obs)
}

/// Execute `midr fit` and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let obs = load_observations(&config.input)?;
    let families = config.family_spec.families();
    let selection = fit_and_select(&obs, &families, &config.dmle);

    if selection.fits.is_empty() {
        let reasons: Vec<String> = selection
            .skipped
            .iter()
            .map(|(family, reason)| format!("{family}: {reason}"))
            .collect();
        return Err(AppError::new(
            4,
            format!("No family could be estimated ({}).", reasons.join("; ")),
        ));
    }

    let summary = FitSummary {
        tool: "midr".to_string(),
        generated_at: Local::now(),
        n_obs: obs.n_obs(),
        n_dims: obs.n_dims(),
        ranked: config.input.ranks,
        fits: selection.fits.clone(),
        best: selection.best,
        skipped: selection.skipped.clone(),
    };

    Ok(RunOutput { selection, summary })
}

/// Execute `midr density`: per-row joint and diagonal densities.
pub fn run_density(config: &DensityConfig) -> Result<DensityOutput, AppError> {
    let obs = load_observations(&config.input)?;
    let family = config.family;

    let (theta, estimated) = match config.theta {
        Some(theta) => (theta, false),
        None => {
            let theta = family.dmle_with(&obs, &config.dmle);
            if theta.is_nan() {
                return Err(AppError::new(
                    4,
                    format!("{family}: diagonal MLE did not converge; pass --theta explicitly."),
                ));
            }
            log::info!("{family}: estimated theta={theta:.6}");
            (theta, true)
        }
    };

    let pdf = family.pdf(&obs, theta, config.log)?;
    let diag = family.diag_pdf(&obs, theta, config.log)?;
    let rows = diagonal(&obs)
        .into_iter()
        .zip(pdf.into_iter().zip(diag))
        .map(|(y, (pdf, diag_pdf))| DensityRow { y, pdf, diag_pdf })
        .collect();

    Ok(DensityOutput {
        theta,
        estimated,
        rows,
    })
}

/// Execute `midr simulate`.
pub fn run_simulate(config: &SimulateConfig) -> Result<PseudoObservations, AppError> {
    let obs = sample(config.family, config.theta, config.rows, config.dims, config.seed)?;
    log::info!(
        "sampled {} x {} from {} (theta={}, seed={})",
        config.rows,
        config.dims,
        config.family,
        config.theta,
        config.seed
    );
    Ok(obs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Family, FamilySpec};
    use crate::fit::DmleOptions;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_input(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("midr-{}-{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(text.as_bytes()).unwrap();
        path
    }

    fn input(path: PathBuf, ranks: bool) -> InputConfig {
        InputConfig {
            path,
            delimiter: b',',
            ranks,
        }
    }

    #[test]
    fn unranked_scores_outside_unit_interval_are_rejected() {
        let path = temp_input("raw.csv", "10,20\n30,40\n");
        let err = load_observations(&input(path.clone(), false)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("--ranks"));

        let obs = load_observations(&input(path, true)).unwrap();
        assert_eq!(obs.row(0), vec![1.0 / 3.0, 1.0 / 3.0]);
    }

    #[test]
    fn fit_pipeline_on_simulated_data() {
        let sim = SimulateConfig {
            family: Family::Clayton,
            theta: 3.0,
            rows: 800,
            dims: 3,
            seed: 9,
            output: None,
        };
        let obs = run_simulate(&sim).unwrap();
        let mut buf = Vec::new();
        crate::io::export::write_matrix(&mut buf, &obs).unwrap();
        let path = temp_input("sim.tsv", std::str::from_utf8(&buf).unwrap());

        let config = FitConfig {
            input: InputConfig {
                path: path.clone(),
                delimiter: b'\t',
                ranks: false,
            },
            family_spec: FamilySpec::All,
            dmle: DmleOptions::default(),
            summary: None,
        };
        let run = run_fit(&config).unwrap();
        assert_eq!(run.summary.n_obs, 800);
        assert_eq!(run.summary.fits.len(), 3);
        assert_eq!(run.summary.best, Some(Family::Clayton));

        let density = run_density(&DensityConfig {
            input: config.input.clone(),
            family: Family::Frank,
            theta: None,
            log: true,
            dmle: DmleOptions::default(),
            output: None,
        })
        .unwrap();
        assert!(density.estimated);
        assert_eq!(density.rows.len(), 800);
        assert!(density.rows.iter().all(|r| r.pdf.is_finite() && r.diag_pdf.is_finite()));
    }
}
