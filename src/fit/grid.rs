//! θ grid generation.
//!
//! The diagonal likelihood is first scanned on a deterministic log-spaced
//! grid over the family's feasible interval. The best grid point and its
//! neighbours then bracket the bounded Brent search.
//!
//! The feasible intervals span many orders of magnitude (Clayton: 1e-14 to
//! 1000), so the grid is uniform in `ln θ`.

use crate::error::CopulaError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, CopulaError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > 0.0 && max > min) {
        return Err(CopulaError::domain(format!(
            "invalid theta range: min={min}, max={max} (must be finite, >0, and max>min)"
        )));
    }
    if steps < 3 {
        return Err(CopulaError::domain("theta grid needs at least 3 steps"));
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    // Pin the endpoints so the bracket never leaves the feasible interval.
    out[0] = min;
    out[steps - 1] = max;
    Ok(out)
}

/// Interval around grid point `idx`: its neighbours, or the grid ends.
pub fn bracket(grid: &[f64], idx: usize) -> (f64, f64) {
    let lo = grid[idx.saturating_sub(1)];
    let hi = grid[(idx + 1).min(grid.len() - 1)];
    (lo, hi)
}
