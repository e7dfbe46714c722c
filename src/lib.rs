#![deny(missing_docs)]

//! gaussvib - Vibrational Hamiltonians from Gaussian anharmonic logs
//!
//! gaussvib reads the text log of a Gaussian 16 `freq=anharmonic` run and
//! turns its force constants into a vibrational Hamiltonian expressed in a
//! harmonic-oscillator basis, ready to be mapped onto qubits by a bosonic
//! operator.
//!
//! # Overview
//!
//! The potential is the Taylor expansion in normal coordinates
//!
//! ```text
//! V = 1/2 Σ F_ii Q_i² + 1/(2√2) Σ F_ijk Q_i Q_j Q_k + 1/4 Σ F_ijkl Q_i Q_j Q_k Q_l
//! ```
//!
//! with each constant divided by the multinomial of its repeated indices.
//! Every term is projected onto `num_modals` harmonic basis functions per
//! mode using closed-form matrix elements of `Q`, `Q²`, `Q³`, `Q⁴` and the
//! kinetic operator `d²/dQ²`.
//!
//! # Pipeline
//!
//! 1. [`log_file`] holds the log lines.
//! 2. [`sections`] extracts the quadratic, cubic and quartic tables.
//! 3. [`numbering`] reads the A → H mode numbering.
//! 4. [`modes`] maps and normalizes the constants into coupling terms.
//! 5. [`integrals`] evaluates the harmonic matrix elements.
//! 6. [`hamiltonian`] fills the per-order tensors and lists their nonzero
//!    elements.
//!
//! # Quick Start
//!
//! ```no_run
//! use gaussvib::GaussianLog;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let log = GaussianLog::new("freq_anharm.log")?;
//!     println!("numbering: {:?}", log.a_to_h_numbering());
//!
//!     // 2 modals per mode, up to 2-mode couplings
//!     let harmonics = log.compute_harmonic_modes(2, 2, 1e-6)?;
//!     for (k, terms) in harmonics.iter().enumerate() {
//!         println!("order {}: {} terms", k + 1, terms.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # References
//!
//! - Ollitrault, P. J. et al., *J. Chem. Phys.* **2020**, 153, 124114.
//! - Table 1 of *J. Chem. Phys.* **2011**, 135, 134108
//!   [DOI: 10.1063/1.3644895](https://doi.org/10.1063/1.3644895)

pub mod hamiltonian;
pub mod integrals;
pub mod log_file;
pub mod modes;
pub mod numbering;
pub mod sections;
pub mod settings;

pub use hamiltonian::{HarmonicHamiltonian, HarmonicTerm};
pub use log_file::{GaussianLog, LogError, LogInput};
pub use modes::ModeTerm;
pub use sections::{ForceConstant, Section};
