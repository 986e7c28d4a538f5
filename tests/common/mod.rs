#![allow(dead_code)]

use midr::domain::PseudoObservations;

/// 10×3 matrix used for the diagonal-MLE regression values.
pub fn dmle_reference() -> PseudoObservations {
    PseudoObservations::from_rows(&[
        vec![0.72122885, 0.64249391, 0.6771109],
        vec![0.48840676, 0.36490127, 0.27721709],
        vec![0.63469281, 0.4517949, 0.62365817],
        vec![0.87942847, 0.15136347, 0.91851515],
        vec![0.34839029, 0.05604025, 0.08416331],
        vec![0.48967318, 0.99356872, 0.66912132],
        vec![0.60683747, 0.4841944, 0.22833209],
        vec![0.30158193, 0.26186022, 0.05502786],
        vec![0.51942063, 0.73040326, 0.25935125],
        vec![0.46365886, 0.2459, 0.83277053],
    ])
    .expect("reference matrix is valid")
}

/// Matrix whose every row is `[y; d]`, so the diagonal statistic is `y`.
pub fn constant_rows(ys: &[f64], d: usize) -> PseudoObservations {
    let rows: Vec<Vec<f64>> = ys.iter().map(|&y| vec![y; d]).collect();
    PseudoObservations::from_rows(&rows).expect("valid rows")
}

/// Midpoints of `n` equal cells on (0, 1).
pub fn midpoints(n: usize) -> Vec<f64> {
    (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect()
}
