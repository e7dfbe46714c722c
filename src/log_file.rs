//! Gaussian log container and the accessors built on top of it.
//!
//! A [`GaussianLog`] holds the raw log as lines and never changes after
//! construction. Everything derived from it (force constants, mode numbering,
//! coupling terms, the Hamiltonian) is recomputed on each call.
//!
//! # Input forms
//!
//! - Text containing a newline is the log content itself.
//! - Text without a newline is a path; the file is read.
//! - A list of lines is taken as-is.
//!
//! ```no_run
//! use gaussvib::GaussianLog;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let log = GaussianLog::new("A_to_H_numbering.log")?;
//!     for fc in log.quartic_force_constants() {
//!         println!("{:?} {}", fc.indices, fc.reduced_value());
//!     }
//!     let harmonics = log.compute_harmonic_modes(2, 2, 1e-6)?;
//!     println!("{} coupling orders", harmonics.len());
//!     Ok(())
//! }
//! ```

use crate::hamiltonian::{HamiltonianError, HarmonicHamiltonian, HarmonicTerm};
use crate::modes::{self, ModeTerm};
use crate::numbering::{self, Numbering};
use crate::sections::{self, ForceConstant, Section};
use log::{debug, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for loading a log.
#[derive(Error, Debug)]
pub enum LogError {
    /// The log file could not be read
    #[error("Failed to read log file {path}: {source}")]
    Io {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The constructor input is neither log text nor a usable path
    #[error("Invalid input for Gaussian log parser: {0}")]
    InvalidInput(String),
}

/// Type alias for log loading results
type Result<T> = std::result::Result<T, LogError>;

/// Accepted constructor inputs for [`GaussianLog`].
#[derive(Debug, Clone)]
pub enum LogInput {
    /// Log content with newlines, or a single-line file path
    Text(String),
    /// Log content already split into lines
    Lines(Vec<String>),
}

impl From<&str> for LogInput {
    fn from(text: &str) -> Self {
        LogInput::Text(text.to_string())
    }
}

impl From<String> for LogInput {
    fn from(text: String) -> Self {
        LogInput::Text(text)
    }
}

impl From<Vec<String>> for LogInput {
    fn from(lines: Vec<String>) -> Self {
        LogInput::Lines(lines)
    }
}

impl From<&[&str]> for LogInput {
    fn from(lines: &[&str]) -> Self {
        LogInput::Lines(lines.iter().map(|l| l.to_string()).collect())
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(String::from).collect()
}

/// A Gaussian 16 log held as lines, with accessors for the anharmonic data.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianLog {
    lines: Vec<String>,
}

impl GaussianLog {
    /// Creates a log from text, a path, or a list of lines.
    ///
    /// # Errors
    ///
    /// - [`LogError::InvalidInput`] for a blank path
    /// - [`LogError::Io`] when the path cannot be read
    pub fn new(input: impl Into<LogInput>) -> Result<Self> {
        match input.into() {
            LogInput::Lines(lines) => Ok(Self { lines }),
            LogInput::Text(text) => {
                if text.contains('\n') {
                    Ok(Self {
                        lines: split_lines(&text),
                    })
                } else if text.trim().is_empty() {
                    Err(LogError::InvalidInput(format!("'{}'", text)))
                } else {
                    Self::from_path(Path::new(&text))
                }
            }
        }
    }

    /// Reads a log from a file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| LogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lines = split_lines(&content);
        info!("Read {} lines from {}", lines.len(), path.display());
        Ok(Self { lines })
    }

    /// The complete log as lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines in the log.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True if the log has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quadratic force constants: 2 labels and 3 values per row.
    ///
    /// Empty if the log has no such table.
    pub fn quadratic_force_constants(&self) -> Vec<ForceConstant> {
        sections::force_constants(&self.lines, Section::Quadratic)
    }

    /// Cubic force constants: 3 labels and 3 values per row.
    pub fn cubic_force_constants(&self) -> Vec<ForceConstant> {
        sections::force_constants(&self.lines, Section::Cubic)
    }

    /// Quartic force constants: 4 labels and 3 values per row.
    pub fn quartic_force_constants(&self) -> Vec<ForceConstant> {
        sections::force_constants(&self.lines, Section::Quartic)
    }

    /// A → H mode numbering, e.g. `"3a" -> 1`.
    pub fn a_to_h_numbering(&self) -> Numbering {
        numbering::a_to_h_numbering(&self.lines)
    }

    /// Coupling terms assembled from all three force-constant tables.
    pub fn compute_modes(&self, normalize: bool) -> Vec<ModeTerm> {
        modes::compute_modes(&self.lines, normalize)
    }

    /// Sparse Hamiltonian in the harmonic basis.
    ///
    /// The number of modes is the size of the A → H numbering. See
    /// [`HarmonicHamiltonian::build`] for the output layout and failures.
    pub fn compute_harmonic_modes(
        &self,
        num_modals: usize,
        truncation_order: usize,
        threshold: f64,
    ) -> std::result::Result<Vec<Vec<HarmonicTerm>>, HamiltonianError> {
        let num_modes = self.a_to_h_numbering().len();
        let entries = self.compute_modes(true);
        debug!(
            "Building Hamiltonian from {} terms over {} modes",
            entries.len(),
            num_modes
        );
        HarmonicHamiltonian::new(num_modals, truncation_order, threshold).build(num_modes, &entries)
    }
}

impl fmt::Display for GaussianLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiline_text_is_content() {
        let log = GaussianLog::new("line one\nline two").unwrap();
        assert_eq!(log.lines(), &["line one".to_string(), "line two".to_string()]);
        assert_eq!(log.to_string(), "line one\nline two");
    }

    #[test]
    fn test_lines_input() {
        let lines: &[&str] = &["a", "b", "c"];
        let log = GaussianLog::new(lines).unwrap();
        assert_eq!(log.len(), 3);
        assert!(!log.is_empty());
    }

    #[test]
    fn test_blank_path_is_invalid() {
        assert!(matches!(GaussianLog::new("  "), Err(LogError::InvalidInput(_))));
        assert!(matches!(GaussianLog::new(""), Err(LogError::InvalidInput(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GaussianLog::new("no_such_dir/no_such_file.log").unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
    }

    #[test]
    fn test_trailing_newline_keeps_empty_last_line() {
        let log = GaussianLog::new("x\n").unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.lines()[1], "");
    }
}
