//! Result exports.
//!
//! - per-row densities as TSV (easy to join back onto the peak list)
//! - the fitted-parameter summary as pretty JSON
//! - sampled pseudo-observation matrices as TSV

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{FitSummary, PseudoObservations};
use crate::error::AppError;

/// One output row of `midr density`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityRow {
    /// Diagonal statistic `max(row)`.
    pub y: f64,
    pub pdf: f64,
    pub diag_pdf: f64,
}

/// Write per-row densities. `log` only labels the columns.
pub fn write_densities<W: Write>(mut out: W, rows: &[DensityRow], log: bool) -> Result<(), AppError> {
    let (pdf, diag) = if log {
        ("log_pdf", "log_diag_pdf")
    } else {
        ("pdf", "diag_pdf")
    };
    writeln!(out, "row\ty\t{pdf}\t{diag}")
        .map_err(|e| AppError::new(2, format!("Failed to write density header: {e}")))?;
    for (i, r) in rows.iter().enumerate() {
        writeln!(out, "{}\t{:.10}\t{:.10e}\t{:.10e}", i + 1, r.y, r.pdf, r.diag_pdf)
            .map_err(|e| AppError::new(2, format!("Failed to write density row: {e}")))?;
    }
    Ok(())
}

/// Write a pseudo-observation matrix, one row per line, tab-separated.
///
/// Values use the shortest representation that parses back exactly.
pub fn write_matrix<W: Write>(out: W, obs: &PseudoObservations) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
    for i in 0..obs.n_obs() {
        let fields: Vec<String> = obs.row(i).iter().map(f64::to_string).collect();
        writer
            .write_record(&fields)
            .map_err(|e| AppError::new(2, format!("Failed to write sample row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample output: {e}")))?;
    Ok(())
}

/// Write the fitted-parameter summary JSON.
pub fn write_summary_json(path: &Path, summary: &FitSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

/// Open `path` for writing, or stdout when no path is given.
pub fn output_sink(path: Option<&Path>) -> Result<Box<dyn Write>, AppError> {
    match path {
        Some(p) => {
            let file = File::create(p).map_err(|e| {
                AppError::new(2, format!("Failed to create output '{}': {e}", p.display()))
            })?;
            Ok(Box::new(std::io::BufWriter::new(file)))
        }
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Family, FamilyFit};
    use chrono::Local;

    #[test]
    fn density_table_has_header_and_rows() {
        let rows = [
            DensityRow { y: 0.5, pdf: 1.25, diag_pdf: 0.75 },
            DensityRow { y: 0.9, pdf: 0.5, diag_pdf: 2.0 },
        ];
        let mut buf = Vec::new();
        write_densities(&mut buf, &rows, true).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "row\ty\tlog_pdf\tlog_diag_pdf");
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("2\t0.9000000000\t"));
    }

    #[test]
    fn matrix_round_trips_through_ingest() {
        let obs = PseudoObservations::from_rows(&[vec![0.25, 0.5], vec![0.75, 0.125]]).unwrap();
        let mut buf = Vec::new();
        write_matrix(&mut buf, &obs).unwrap();
        let back = crate::io::ingest::read_matrix(buf.as_slice(), b'\t').unwrap();
        assert_eq!(&back.values, obs.values());
    }

    #[test]
    fn summary_serializes_family_names_lowercase() {
        let summary = FitSummary {
            tool: "midr".to_string(),
            generated_at: Local::now(),
            n_obs: 10,
            n_dims: 3,
            ranked: false,
            fits: vec![FamilyFit {
                family: Family::Gumbel,
                theta: 1.5,
                diag_loglik: -1.0,
                loglik: -2.0,
                bic: 6.3,
            }],
            best: Some(Family::Gumbel),
            skipped: vec![],
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"family\":\"gumbel\""));
        assert!(json.contains("\"best\":\"gumbel\""));
    }
}
