// Integration tests for mode assembly and the harmonic-basis Hamiltonian
use gaussvib::hamiltonian::{self, HamiltonianError};
use gaussvib::integrals::{harmonic_integral, IntegralError};
use gaussvib::GaussianLog;
use std::f64::consts::SQRT_2;
use tempfile::TempDir;

const SAMPLE_LOG: &str = include_str!("data/freq_anharm.log");
const TOL: f64 = 1e-8;

fn sample() -> GaussianLog {
    GaussianLog::new(SAMPLE_LOG).unwrap()
}

#[test]
fn test_compute_modes_layout() {
    let modes = sample().compute_modes(true);
    // 4 quadratic (each with a kinetic twin), 5 cubic, 4 quartic
    assert_eq!(modes.len(), 17);

    // '1' has H number 1, reversed over 4 modes to index 4
    assert_eq!(modes[0].indices, vec![4, 4]);
    assert!((modes[0].coefficient - 1409.20235 / 4.0).abs() < TOL);
    assert_eq!(modes[1].indices, vec![-4, -4]);
    assert_eq!(modes[1].coefficient, -modes[0].coefficient);

    // cubic '2 2 1' -> [3, 3, 4], divisor 2√2 · 2!
    assert_eq!(modes[9].indices, vec![3, 3, 4]);
    assert!((modes[9].coefficient - (-498.94440 / (2.0 * SQRT_2 * 2.0))).abs() < TOL);

    // quartic '3a 3a 3a 3a' -> [2, 2, 2, 2], divisor 4 · 4!
    assert_eq!(modes[15].indices, vec![2, 2, 2, 2]);
    assert!((modes[15].coefficient - 220.54851 / 96.0).abs() < TOL);
}

#[test]
fn test_compute_modes_without_normalization() {
    let modes = sample().compute_modes(false);
    assert!((modes[9].coefficient - (-498.94440 / (2.0 * SQRT_2))).abs() < TOL);
    assert!((modes[15].coefficient - 220.54851 / 4.0).abs() < TOL);
}

#[test]
fn test_unnumbered_modes_are_dropped() {
    let text = SAMPLE_LOG.replace("3b    3b       3803.06353", "3c    3c       3803.06353");
    let log = GaussianLog::new(text).unwrap();
    let modes = log.compute_modes(true);
    assert_eq!(modes.len(), 15);
}

#[test]
fn test_no_numbering_gives_no_terms() {
    let text = SAMPLE_LOG.replace("Input/Output information", "Input and output");
    let log = GaussianLog::new(text).unwrap();
    assert!(log.a_to_h_numbering().is_empty());
    assert!(log.compute_modes(true).is_empty());
    assert!(log.compute_harmonic_modes(2, 3, 1e-6).unwrap().is_empty());
}

#[test]
fn test_one_body_hamiltonian() {
    let harmonics = sample().compute_harmonic_modes(2, 1, 1e-6).unwrap();
    assert_eq!(harmonics.len(), 1);

    let terms = &harmonics[0];
    assert!(terms.iter().all(|t| t.modes.len() == 1));

    let value_at = |coord: [usize; 3]| {
        terms
            .iter()
            .find(|t| t.modes[0] == coord)
            .map(|t| t.coefficient)
    };

    // mode '1' is tensor mode 3: potential + kinetic quadratic plus quartic <0|Q^4|0>
    let expected = 2.0 * 1409.20235 / 4.0 + 3.0 * 40.39063 / 96.0;
    assert!((value_at([3, 0, 0]).unwrap() - expected).abs() < TOL);

    // off-diagonal only from the cubic Q^3 term, mirrored
    let cubic = 3.0 * -260.36071 / (2.0 * SQRT_2 * 6.0);
    assert!((value_at([3, 1, 0]).unwrap() - cubic).abs() < TOL);
    assert_eq!(value_at([3, 1, 0]), value_at([3, 0, 1]));

    // row-major ordering of the output
    let coords: Vec<[usize; 3]> = terms.iter().map(|t| t.modes[0]).collect();
    let mut sorted = coords.clone();
    sorted.sort();
    assert_eq!(coords, sorted);
}

#[test]
fn test_one_body_reference_values() {
    // reference output for the sample log: '3b' (tensor mode 0) carries only
    // its quadratic term, potential and kinetic parts adding up
    let harmonics = sample().compute_harmonic_modes(2, 1, 1e-6).unwrap();
    let terms = &harmonics[0];

    assert_eq!(terms[0].modes, vec![[0, 0, 0]]);
    assert!((terms[0].coefficient - 1901.531765).abs() < 1e-6);
    assert_eq!(terms[1].modes, vec![[0, 1, 1]]);
    assert!((terms[1].coefficient - 5704.595295).abs() < 1e-6);

    // '3a' (tensor mode 1) adds its diagonal quartic <0|Q^4|0> = 3
    let expected = 2.0 * 3803.06347 / 4.0 + 3.0 * 220.54851 / 96.0;
    let diagonal = terms.iter().find(|t| t.modes == vec![[1, 0, 0]]).unwrap();
    assert!((diagonal.coefficient - expected).abs() < TOL);
}

#[test]
fn test_full_truncation_orders() {
    let harmonics = sample().compute_harmonic_modes(2, 3, 1e-6).unwrap();
    assert_eq!(harmonics.len(), 3);
    assert!(harmonics[1].iter().all(|t| t.modes.len() == 2));

    // '3a 2 1' is the only three-mode term; each Q_i only couples (1,0)
    let three_body = &harmonics[2];
    assert_eq!(three_body.len(), 8);
    let expected = 12.34567 / (2.0 * SQRT_2);
    assert!(three_body
        .iter()
        .all(|t| (t.coefficient - expected).abs() < TOL));
}

#[test]
fn test_unsupported_truncation_order() {
    let err = sample().compute_harmonic_modes(2, 4, 1e-6).unwrap_err();
    assert!(matches!(err, HamiltonianError::UnsupportedTruncation(4)));
}

#[test]
fn test_invalid_integral_power() {
    assert_eq!(harmonic_integral(1, 1, 5, false), Err(IntegralError::InvalidPower(5)));
}

#[test]
fn test_json_export_file() {
    let harmonics = sample().compute_harmonic_modes(2, 2, 1e-6).unwrap();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("terms.json");
    hamiltonian::write_json(&harmonics, &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert!(value[0][0]["modes"].is_array());
}
