//! Assembly of per-mode coupling terms from raw force constants.
//!
//! Each force-constant row is turned into a [`ModeTerm`]: its labels are
//! mapped through the A → H numbering and then reversed so that the highest
//! harmonic mode becomes mode 1, and its reduced value (cm⁻¹) is scaled by
//! the Taylor-expansion prefactor of its order.
//!
//! | Section   | Divisor                        |
//! |-----------|--------------------------------|
//! | quadratic | 2 · multinomial                |
//! | cubic     | 2√2 · multinomial              |
//! | quartic   | 4 · multinomial                |
//!
//! Quadratic rows are emitted twice: once as the potential term and once with
//! the coefficient and every index negated. A negative index marks a kinetic
//! term for the tensor builder.

use crate::numbering::{self, Numbering};
use crate::sections::{self, ForceConstant, Section};
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;

const QUADRATIC_FACTOR: f64 = 2.0;
const CUBIC_FACTOR: f64 = 2.0 * std::f64::consts::SQRT_2;
const QUARTIC_FACTOR: f64 = 4.0;

/// A coupling coefficient together with the (signed, 1-based) modes it acts on.
///
/// Repeated indices encode powers of the same coordinate, so `[2, 2, 1]` is
/// a Q₂²Q₁ term.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeTerm {
    /// Normalized force constant
    pub coefficient: f64,
    /// Mode indices; all negative for the kinetic twin of a quadratic term
    pub indices: Vec<i64>,
}

impl ModeTerm {
    /// Returns the kinetic twin: coefficient and every index negated.
    pub fn negated(&self) -> Self {
        Self {
            coefficient: -self.coefficient,
            indices: self.indices.iter().map(|i| -i).collect(),
        }
    }
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Product of the factorials of the multiplicity of each distinct index.
///
/// `[1, 1, 2]` gives 2! · 1! = 2, `[2, 2, 2]` gives 3! = 6.
pub fn multinomial(indices: &[i64]) -> f64 {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for &index in indices {
        *counts.entry(index).or_insert(0) += 1;
    }
    counts.values().map(|&count| factorial(count)).product()
}

/// Maps string mode labels to reversed H indices (`max_h + 1 - H`).
///
/// Returns `None` if any label has no entry in the numbering.
pub fn process_entry_indices(
    labels: &[String],
    numbering: &Numbering,
    max_h: u32,
) -> Option<Vec<i64>> {
    labels
        .iter()
        .map(|label| {
            numbering
                .get(label)
                .map(|&h| i64::from(max_h) + 1 - i64::from(h))
        })
        .collect()
}

fn assemble(
    records: &[ForceConstant],
    numbering: &Numbering,
    max_h: u32,
    factor: f64,
    normalize: bool,
) -> (Vec<ModeTerm>, usize) {
    let mut terms = Vec::with_capacity(records.len());
    let mut dropped = 0;
    for record in records {
        let indices = match process_entry_indices(&record.indices, numbering, max_h) {
            Some(indices) if !indices.is_empty() => indices,
            _ => {
                dropped += 1;
                continue;
            }
        };
        let divisor = if normalize {
            factor * multinomial(&indices)
        } else {
            factor
        };
        terms.push(ModeTerm {
            coefficient: record.reduced_value() / divisor,
            indices,
        });
    }
    (terms, dropped)
}

/// Builds the coupling terms from the quadratic, cubic and quartic tables.
///
/// Quadratic terms come first, each immediately followed by its kinetic
/// twin, then cubic and quartic terms, all in log order. With `normalize`
/// set the divisor includes the [`multinomial`] of the indices.
pub fn compute_modes(lines: &[String], normalize: bool) -> Vec<ModeTerm> {
    let numbering = numbering::a_to_h_numbering(lines);
    let max_h = match numbering::max_h_value(&numbering) {
        Some(max_h) => max_h,
        None => {
            debug!("No mode numbering found; no coupling terms assembled");
            return Vec::new();
        }
    };

    let mut modes = Vec::new();

    let quadratic = sections::force_constants(lines, Section::Quadratic);
    let (terms, q_dropped) = assemble(&quadratic, &numbering, max_h, QUADRATIC_FACTOR, normalize);
    for term in terms {
        let twin = term.negated();
        modes.push(term);
        modes.push(twin);
    }

    let cubic = sections::force_constants(lines, Section::Cubic);
    let (terms, c_dropped) = assemble(&cubic, &numbering, max_h, CUBIC_FACTOR, normalize);
    modes.extend(terms);

    let quartic = sections::force_constants(lines, Section::Quartic);
    let (terms, r_dropped) = assemble(&quartic, &numbering, max_h, QUARTIC_FACTOR, normalize);
    modes.extend(terms);

    let dropped = q_dropped + c_dropped + r_dropped;
    if dropped > 0 {
        debug!("Dropped {} force constants with unnumbered modes", dropped);
    }
    debug!("Assembled {} coupling terms", modes.len());

    modes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multinomial() {
        assert_eq!(multinomial(&[1, 1, 2]), 2.0);
        assert_eq!(multinomial(&[1, 2, 3]), 1.0);
        assert_eq!(multinomial(&[2, 2, 2]), 6.0);
        assert_eq!(multinomial(&[3, 3, 3, 3]), 24.0);
        assert_eq!(multinomial(&[1, 1, 2, 2]), 4.0);
    }

    #[test]
    fn test_process_entry_indices_reverses_numbering() {
        let numbering: Numbering = [("1a", 1), ("1b", 2), ("2a", 3)]
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        let labels = vec!["1b".to_string(), "2a".to_string()];
        assert_eq!(process_entry_indices(&labels, &numbering, 3), Some(vec![2, 1]));
    }

    #[test]
    fn test_process_entry_indices_unknown_label() {
        let numbering: Numbering = [("1".to_string(), 1)].into_iter().collect();
        let labels = vec!["1".to_string(), "9".to_string()];
        assert_eq!(process_entry_indices(&labels, &numbering, 1), None);
    }

    #[test]
    fn test_negated_twin() {
        let term = ModeTerm { coefficient: 0.25, indices: vec![2, 2] };
        let twin = term.negated();
        assert_eq!(twin.coefficient, -0.25);
        assert_eq!(twin.indices, vec![-2, -2]);
    }

    #[test]
    fn test_assemble_divisors() {
        let numbering: Numbering = [("1".to_string(), 1), ("2".to_string(), 2)]
            .into_iter()
            .collect();
        let record = ForceConstant {
            indices: vec!["1".to_string(), "1".to_string(), "2".to_string()],
            values: [1.0, 0.0, 0.0],
        };
        let (terms, dropped) = assemble(&[record.clone()], &numbering, 2, CUBIC_FACTOR, true);
        assert_eq!(dropped, 0);
        assert_eq!(terms[0].indices, vec![2, 2, 1]);
        let expected = 1.0 / (2.0 * 2.0_f64.sqrt() * 2.0);
        assert!((terms[0].coefficient - expected).abs() < 1e-12);

        let (terms, _) = assemble(&[record], &numbering, 2, CUBIC_FACTOR, false);
        let expected = 1.0 / (2.0 * 2.0_f64.sqrt());
        assert!((terms[0].coefficient - expected).abs() < 1e-12);
    }
}
