//! Vibrational Hamiltonian in the harmonic-oscillator basis.
//!
//! The coupling terms from [`crate::modes`] are expanded over `num_modals`
//! harmonic basis functions per mode. For a term acting on `k` distinct
//! modes the contribution to `<m₁…mₖ| H |n₁…nₖ>` is the product of the
//! one-mode integrals, each raised to the multiplicity of its mode.
//!
//! # Tensor layout
//!
//! For coupling order `k` the dense tensor has shape
//! `(num_modes, num_modals, num_modals)` repeated `k` times; axis triple `i`
//! holds `(mode, row, col)` of the i-th participating mode. Each triple is
//! symmetric in `(row, col)`, so every lower-triangle value is also written
//! to the swapped positions.
//!
//! # Sparse output
//!
//! Nonzero entries are listed in row-major order of the tensor, one list per
//! coupling order that has any. This is the structure handed to the bosonic
//! operator construction:
//!
//! ```text
//! [                                   // order 1
//!   ([[mode, row, col]], value), ...
//! ],
//! [                                   // order 2
//!   ([[mode, row, col], [mode, row, col]], value), ...
//! ]
//! ```

use crate::integrals::{harmonic_integral, IntegralError};
use crate::modes::ModeTerm;
use log::{debug, info};
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Highest number of distinct modes a single term may couple.
pub const MAX_COUPLING_ORDER: usize = 3;

/// Upper bound on the number of elements in one dense tensor.
pub const MAX_TENSOR_ELEMENTS: usize = 1 << 28;

/// Error type for Hamiltonian construction.
#[derive(Error, Debug)]
pub enum HamiltonianError {
    /// A term couples more distinct modes than the tensor layout supports
    #[error("Unexpected order value of {0}")]
    UnexpectedOrder(usize),
    /// Requested truncation order is outside 1..=3
    #[error("Unsupported truncation order {0}; expected 1, 2 or 3")]
    UnsupportedTruncation(usize),
    /// A term references a mode outside 1..=num_modes
    #[error("Mode index {index} is outside 1..={num_modes}")]
    ModeOutOfRange {
        /// Offending 1-based mode index
        index: i64,
        /// Number of modes in the numbering
        num_modes: usize,
    },
    /// The dense tensor for an order would be too large
    #[error("Tensor for order {order} would need {elements} elements (limit {limit})")]
    TensorTooLarge {
        /// Coupling order
        order: usize,
        /// Requested element count, saturated on overflow
        elements: usize,
        /// Configured ceiling
        limit: usize,
    },
    /// Matrix element evaluation failed
    #[error("Integral error: {0}")]
    Integral(#[from] IntegralError),
    /// File system error while exporting
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error while exporting
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Hamiltonian construction results
type Result<T> = std::result::Result<T, HamiltonianError>;

/// One nonzero element of the Hamiltonian.
///
/// `modes` holds one `[mode, row, col]` triple (0-based) per participating
/// mode, so its length is the coupling order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonicTerm {
    /// `[mode, row, col]` for each coupled mode
    pub modes: Vec<[usize; 3]>,
    /// Matrix element value
    pub coefficient: f64,
}

/// Settings for building the harmonic-basis Hamiltonian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicHamiltonian {
    /// Number of basis functions per mode
    pub num_modals: usize,
    /// Highest number of distinct coupled modes kept (1, 2 or 3)
    pub truncation_order: usize,
    /// Contributions with magnitude at or below this are discarded
    pub threshold: f64,
}

impl Default for HarmonicHamiltonian {
    fn default() -> Self {
        Self {
            num_modals: 2,
            truncation_order: 3,
            threshold: 1e-6,
        }
    }
}

/// Distinct modes of a term in first-appearance order with multiplicities,
/// plus the kinetic flag (any negative index).
fn group_indices(indices: &[i64]) -> (Vec<(i64, u32)>, bool) {
    let kinetic = indices.iter().any(|&i| i < 0);
    let mut groups: Vec<(i64, u32)> = Vec::new();
    for &index in indices {
        let index = index.abs();
        match groups.iter_mut().find(|(mode, _)| *mode == index) {
            Some((_, count)) => *count += 1,
            None => groups.push((index, 1)),
        }
    }
    (groups, kinetic)
}

/// Lower-triangle `(row, col)` pairs, rows ascending, `col <= row`.
fn lower_triangle(num_modals: usize) -> Vec<(usize, usize)> {
    (0..num_modals)
        .flat_map(|m| (0..=m).map(move |n| (m, n)))
        .collect()
}

impl HarmonicHamiltonian {
    /// Creates a builder with the given basis size, truncation and threshold.
    pub fn new(num_modals: usize, truncation_order: usize, threshold: f64) -> Self {
        Self {
            num_modals,
            truncation_order,
            threshold,
        }
    }

    fn check_truncation(&self) -> Result<()> {
        if (1..=MAX_COUPLING_ORDER).contains(&self.truncation_order) {
            Ok(())
        } else {
            Err(HamiltonianError::UnsupportedTruncation(self.truncation_order))
        }
    }

    fn tensor_shape(&self, num_modes: usize, order: usize) -> Result<Vec<usize>> {
        let block = num_modes
            .checked_mul(self.num_modals)
            .and_then(|v| v.checked_mul(self.num_modals));
        let elements = block.and_then(|b| b.checked_pow(order as u32));
        match elements {
            Some(elements) if elements <= MAX_TENSOR_ELEMENTS => Ok((0..order)
                .flat_map(|_| [num_modes, self.num_modals, self.num_modals])
                .collect()),
            other => Err(HamiltonianError::TensorTooLarge {
                order,
                elements: other.unwrap_or(usize::MAX),
                limit: MAX_TENSOR_ELEMENTS,
            }),
        }
    }

    /// Builds the sparse Hamiltonian for `num_modes` modes from coupling terms.
    ///
    /// Returns one list per coupling order from 1 to `truncation_order` that
    /// has nonzero elements. Fails without partial output if the truncation
    /// order is unsupported, a term couples more than three modes, or a mode
    /// index is out of range.
    pub fn build(&self, num_modes: usize, terms: &[ModeTerm]) -> Result<Vec<Vec<HarmonicTerm>>> {
        self.check_truncation()?;

        let shapes = (1..=self.truncation_order)
            .map(|order| self.tensor_shape(num_modes, order))
            .collect::<Result<Vec<_>>>()?;
        let mut tensors: Vec<ArrayD<f64>> = shapes
            .iter()
            .map(|shape| ArrayD::zeros(IxDyn(shape)))
            .collect();

        let pairs = lower_triangle(self.num_modals);
        for term in terms {
            let (groups, kinetic) = group_indices(&term.indices);
            let order = groups.len();
            if order > MAX_COUPLING_ORDER {
                return Err(HamiltonianError::UnexpectedOrder(order));
            }
            if order == 0 || order > self.truncation_order {
                continue;
            }

            let mut axes = Vec::with_capacity(order);
            for &(mode, power) in &groups {
                if mode < 1 || mode as usize > num_modes {
                    return Err(HamiltonianError::ModeOutOfRange {
                        index: mode,
                        num_modes,
                    });
                }
                axes.push(((mode - 1) as usize, power));
            }

            self.accumulate(&mut tensors[order - 1], &axes, &pairs, term.coefficient, kinetic)?;
        }

        let harmonics = sparsify(&tensors);
        info!(
            "Built harmonic Hamiltonian: {} modes, {} modals, {} order(s) with terms",
            num_modes,
            self.num_modals,
            harmonics.len()
        );
        Ok(harmonics)
    }

    /// Adds one term into the tensor of its order.
    ///
    /// Walks every combination of lower-triangle pairs (first mode outermost),
    /// multiplies the per-mode integrals onto the coefficient and, above the
    /// threshold, adds the product at every row/col swap of the pairs.
    fn accumulate(
        &self,
        tensor: &mut ArrayD<f64>,
        axes: &[(usize, u32)],
        pairs: &[(usize, usize)],
        coefficient: f64,
        kinetic: bool,
    ) -> Result<()> {
        let order = axes.len();
        if pairs.is_empty() {
            return Ok(());
        }

        let mut cursor = vec![0usize; order];
        let mut index = vec![0usize; 3 * order];
        loop {
            let mut coeff = coefficient;
            for (i, &(_, power)) in axes.iter().enumerate() {
                let (m, n) = pairs[cursor[i]];
                coeff *= harmonic_integral(m, n, power, kinetic)?;
            }

            if coeff.abs() > self.threshold {
                for mask in 0..(1usize << order) {
                    let mut valid = true;
                    for (i, &(mode, _)) in axes.iter().enumerate() {
                        let (m, n) = pairs[cursor[i]];
                        let swap = mask & (1 << i) != 0;
                        if swap && m == n {
                            valid = false;
                            break;
                        }
                        let (row, col) = if swap { (n, m) } else { (m, n) };
                        index[3 * i] = mode;
                        index[3 * i + 1] = row;
                        index[3 * i + 2] = col;
                    }
                    if valid {
                        tensor[&index[..]] += coeff;
                    }
                }
            }

            // odometer over pair combinations, last mode fastest
            let mut pos = order;
            loop {
                if pos == 0 {
                    return Ok(());
                }
                pos -= 1;
                cursor[pos] += 1;
                if cursor[pos] < pairs.len() {
                    break;
                }
                cursor[pos] = 0;
            }
        }
    }
}

/// Collects the nonzero entries of each tensor in row-major order.
fn sparsify(tensors: &[ArrayD<f64>]) -> Vec<Vec<HarmonicTerm>> {
    let mut harmonics = Vec::new();
    for (k, tensor) in tensors.iter().enumerate() {
        let order = k + 1;
        let terms: Vec<HarmonicTerm> = tensor
            .indexed_iter()
            .filter(|(_, value)| **value != 0.0)
            .map(|(idx, &value)| HarmonicTerm {
                modes: (0..order)
                    .map(|j| [idx[3 * j], idx[3 * j + 1], idx[3 * j + 2]])
                    .collect(),
                coefficient: value,
            })
            .collect();
        debug!("Order {}: {} nonzero elements", order, terms.len());
        if !terms.is_empty() {
            harmonics.push(terms);
        }
    }
    harmonics
}

/// Serializes the sparse Hamiltonian to pretty-printed JSON.
pub fn to_json_string(harmonics: &[Vec<HarmonicTerm>]) -> Result<String> {
    Ok(serde_json::to_string_pretty(harmonics)?)
}

/// Writes the sparse Hamiltonian as JSON to `path`.
pub fn write_json(harmonics: &[Vec<HarmonicTerm>], path: &Path) -> Result<()> {
    let json = to_json_string(harmonics)?;
    fs::write(path, json)?;
    info!("Wrote harmonic terms to {}", path.display());
    Ok(())
}
