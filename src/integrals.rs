//! Harmonic-oscillator matrix elements of powers of the normal coordinate.
//!
//! Closed forms from the ladder-operator algebra, as tabulated in
//! J. Chem. Phys. 135, 134108 (2011), Table 1. Only the lower triangle
//! (`m >= n`) is evaluated; callers mirror the result into `(n, m)`.
//!
//! | power | m − n | element                       |
//! |-------|-------|-------------------------------|
//! | 1     | 1     | √(m/2)                        |
//! | 2     | 0     | m + ½ (kinetic: −(m + ½))     |
//! | 2     | 2     | √(m(m−1)) / 2                 |
//! | 3     | 1     | 3 (m/2)^{3/2}                 |
//! | 3     | 3     | √(m(m−1)(m−2)) / 2^{3/2}      |
//! | 4     | 0     | (6m(m+1) + 3) / 4             |
//! | 4     | 2     | (m − ½) √(m(m−1))             |
//! | 4     | 4     | √(m(m−1)(m−2)(m−3)) / 4       |
//!
//! Any other `m − n` gives zero.

use std::f64::consts::SQRT_2;
use thiserror::Error;

/// Error type for matrix element evaluation.
#[derive(Error, Debug, PartialEq)]
pub enum IntegralError {
    /// The coordinate power is outside 1..=4
    #[error("The expansion order of the PES is too high: power {0} is not in 1..=4")]
    InvalidPower(u32),
}

/// Highest coordinate power with a closed form.
pub const MAX_POWER: u32 = 4;

/// Unscaled ladder-operator element `<m| Q^power |n>`.
///
/// With `kinetic` set and `power == 2` the element of `d²/dQ²` is returned
/// instead; the flag has no effect on other powers.
pub fn ladder_element(m: usize, n: usize, power: u32, kinetic: bool) -> Result<f64, IntegralError> {
    let diff = m as i64 - n as i64;
    let mf = m as f64;

    let coeff = match (power, diff) {
        (1, 1) => (mf / 2.0).sqrt(),
        (1, _) => 0.0,
        (2, 0) if kinetic => -(mf + 0.5),
        (2, 0) => mf + 0.5,
        (2, 2) => (mf * (mf - 1.0)).sqrt() / 2.0,
        (2, _) => 0.0,
        (3, 1) => 3.0 * (mf / 2.0).powf(1.5),
        (3, 3) => (mf * (mf - 1.0) * (mf - 2.0)).sqrt() / 2.0_f64.powf(1.5),
        (3, _) => 0.0,
        (4, 0) => (6.0 * mf * (mf + 1.0) + 3.0) / 4.0,
        (4, 2) => (mf - 0.5) * (mf * (mf - 1.0)).sqrt(),
        (4, 4) => (mf * (mf - 1.0) * (mf - 2.0) * (mf - 3.0)).sqrt() / 4.0,
        (4, _) => 0.0,
        (p, _) => return Err(IntegralError::InvalidPower(p)),
    };

    Ok(coeff)
}

/// Matrix element of the harmonic basis, `ladder_element` scaled by (√2)^power.
pub fn harmonic_integral(m: usize, n: usize, power: u32, kinetic: bool) -> Result<f64, IntegralError> {
    let coeff = ladder_element(m, n, power, kinetic)?;
    Ok(coeff * SQRT_2.powi(power as i32))
}
