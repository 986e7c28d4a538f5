use midr::data::{pseudo_observations, sample};
use midr::domain::Family;
use midr::fit::{fit_and_select, DmleOptions};

fn recovers(family: Family, theta: f64, band: f64, seed: u64) {
    let obs = sample(family, theta, 4000, 3, seed).unwrap();
    let est = family.dmle(&obs);
    assert!(
        (est - theta).abs() < band,
        "{family}: generated theta={theta}, estimated {est}"
    );
}

#[test]
fn clayton_recovers_generating_theta() {
    recovers(Family::Clayton, 2.0, 0.5, 17);
}

#[test]
fn frank_recovers_generating_theta() {
    recovers(Family::Frank, 4.0, 0.8, 23);
}

#[test]
fn gumbel_recovers_generating_theta() {
    recovers(Family::Gumbel, 2.0, 0.25, 29);
}

#[test]
fn rank_transform_keeps_the_estimate_close() {
    let obs = sample(Family::Gumbel, 2.0, 4000, 3, 31).unwrap();
    let ranked = pseudo_observations(obs.values()).unwrap();
    let raw = Family::Gumbel.dmle(&obs);
    let rk = Family::Gumbel.dmle(&ranked);
    assert!((raw - rk).abs() < 0.1, "raw={raw}, ranked={rk}");
}

#[test]
fn selection_picks_the_generating_family() {
    let obs = sample(Family::Gumbel, 3.0, 2000, 3, 41).unwrap();
    let sel = fit_and_select(&obs, &Family::ALL, &DmleOptions::default());
    assert_eq!(sel.best, Some(Family::Gumbel), "{:?}", sel.fits);
}
