//! Rank transform of raw replicate scores.
//!
//! Each column is replaced by its ranks (ties averaged) divided by `n + 1`,
//! which maps every entry strictly inside (0, 1).

use nalgebra::DMatrix;

use crate::domain::PseudoObservations;
use crate::error::CopulaError;

/// 1-based ranks with ties averaged.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut out = vec![0.0; values.len()];
    let mut i = 0usize;
    while i < indexed.len() {
        let mut j = i;
        while j + 1 < indexed.len() && indexed[j + 1].1 == indexed[i].1 {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for entry in &indexed[i..=j] {
            out[entry.0] = avg_rank;
        }
        i = j + 1;
    }
    out
}

/// Column-wise `rank / (n + 1)`.
///
/// # Errors
/// `CopulaError::Domain` for non-finite scores, plus the shape checks of
/// [`PseudoObservations::new`].
pub fn pseudo_observations(scores: &DMatrix<f64>) -> Result<PseudoObservations, CopulaError> {
    if let Some(bad) = scores.iter().find(|v| !v.is_finite()) {
        return Err(CopulaError::domain(format!("non-finite score {bad}")));
    }
    let n = scores.nrows();
    let scale = 1.0 / (n as f64 + 1.0);
    let mut out = DMatrix::zeros(n, scores.ncols());
    for (j, column) in scores.column_iter().enumerate() {
        let values: Vec<f64> = column.iter().copied().collect();
        for (i, r) in ranks(&values).into_iter().enumerate() {
            out[(i, j)] = r * scale;
        }
    }
    PseudoObservations::new(out)
}
