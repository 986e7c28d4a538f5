//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays clean and testable
//! - output changes are localized

use crate::domain::FitSummary;

/// Format the fit summary: dataset shape, one line per family, the choice.
pub fn format_fit_summary(summary: &FitSummary) -> String {
    let mut out = String::new();

    out.push_str("=== midr - Archimedean copula fit ===\n");
    out.push_str(&format!(
        "Data: n={} observations x d={} replicates{}\n",
        summary.n_obs,
        summary.n_dims,
        if summary.ranked { " (rank-transformed)" } else { "" }
    ));

    out.push_str("\nFamilies:\n");
    for fit in &summary.fits {
        let chosen = if Some(fit.family) == summary.best { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<8} theta={:<12} diag_loglik={:<12.4} loglik={:<12.4} BIC={:.4}\n",
            fit.family.display_name(),
            fmt_theta(fit.theta),
            fit.diag_loglik,
            fit.loglik,
            fit.bic
        ));
    }
    for (family, reason) in &summary.skipped {
        out.push_str(&format!("  (skipped {}) {reason}\n", family.display_name()));
    }

    match summary.best {
        Some(family) => out.push_str(&format!("\nChosen family: {}\n", family.display_name())),
        None => out.push_str("\nChosen family: none\n"),
    }

    out
}

fn fmt_theta(theta: f64) -> String {
    if theta.abs() >= 1e4 || (theta != 0.0 && theta.abs() < 1e-3) {
        format!("{theta:.4e}")
    } else {
        format!("{theta:.6}")
    }
}
