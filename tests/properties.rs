mod common;

use approx::assert_abs_diff_eq;
use midr::domain::{Family, PseudoObservations};
use nalgebra::DMatrix;

#[test]
fn independence_limit_densities() {
    let obs = common::dmle_reference();
    for family in Family::ALL {
        let theta = family.independence_theta();
        for v in family.pdf(&obs, theta, false).unwrap() {
            assert_abs_diff_eq!(v, 1.0, epsilon = 1e-10);
        }
        let diag = family.diag_pdf(&obs, theta, false).unwrap();
        for (i, v) in diag.iter().enumerate() {
            let y = obs.row(i).into_iter().fold(0.0, f64::max);
            assert_abs_diff_eq!(*v, 3.0 * y * y, epsilon = 1e-10);
        }
    }
}

#[test]
fn frank_density_approaches_independence_for_small_theta() {
    let obs = common::dmle_reference();
    for v in Family::Frank.pdf(&obs, 1e-6, false).unwrap() {
        assert_abs_diff_eq!(v, 1.0, epsilon = 1e-4);
    }
}

#[test]
fn generator_round_trip() {
    let grid: Vec<f64> = (1..100).map(|i| i as f64 / 100.0).collect();
    let u = DMatrix::from_row_slice(grid.len(), 1, &grid);
    let cases = [
        (Family::Clayton, vec![-0.3, 0.5, 3.0, 12.0]),
        (Family::Frank, vec![-3.0, 0.5, 5.0, 30.0]),
        (Family::Gumbel, vec![1.0, 2.5, 10.0]),
    ];
    for (family, thetas) in cases {
        for theta in thetas {
            let back = family.psi(&family.ipsi(&u, theta, false), theta);
            for (orig, rt) in u.iter().zip(back.iter()) {
                assert_abs_diff_eq!(*orig, *rt, epsilon = 1e-8);
            }
        }
    }
}

#[test]
fn diagonal_density_integrates_to_one() {
    let ys = common::midpoints(20_000);
    let h = 1.0 / ys.len() as f64;
    let cases = [
        (Family::Clayton, 2.0),
        (Family::Clayton, 0.3),
        (Family::Frank, 4.0),
        (Family::Frank, 0.05),
        (Family::Gumbel, 2.0),
    ];
    for d in [2usize, 3] {
        let obs = common::constant_rows(&ys, d);
        for (family, theta) in cases {
            let mass: f64 = family.diag_pdf(&obs, theta, false).unwrap().iter().sum::<f64>() * h;
            assert_abs_diff_eq!(mass, 1.0, epsilon = 1e-3);
        }
    }
}

#[test]
fn joint_density_is_symmetric_in_replicates() {
    let a = PseudoObservations::from_rows(&[vec![0.2, 0.7, 0.4]]).unwrap();
    let b = PseudoObservations::from_rows(&[vec![0.7, 0.4, 0.2]]).unwrap();
    for (family, theta) in [(Family::Clayton, 1.5), (Family::Frank, 2.5), (Family::Gumbel, 1.8)] {
        let pa = family.pdf(&a, theta, true).unwrap()[0];
        let pb = family.pdf(&b, theta, true).unwrap()[0];
        assert_abs_diff_eq!(pa, pb, epsilon = 1e-10);
    }
}

#[test]
fn log_and_natural_scales_agree() {
    let obs = common::dmle_reference();
    for (family, theta) in [(Family::Clayton, 0.7), (Family::Frank, 3.0), (Family::Gumbel, 1.4)] {
        let natural = family.pdf(&obs, theta, false).unwrap();
        let log = family.pdf(&obs, theta, true).unwrap();
        for (n, l) in natural.iter().zip(&log) {
            assert_abs_diff_eq!(n.ln(), *l, epsilon = 1e-12);
        }
    }
}
