//! Force-constant section extraction from Gaussian anharmonic logs.
//!
//! A Gaussian `freq=anharmonic` run prints its quadratic, cubic and quartic
//! force constants in normal-mode coordinates as boxed banners followed by a
//! table:
//!
//! ```text
//!  ...............................................................
//!  :            QUADRATIC FORCE CONSTANTS IN NORMAL MODES         :
//!  ...............................................................
//!
//!           I     J         FI(I,J)          k(I,J)          K(I,J)
//!           1     1       1409.20235          1.17003          0.07515
//!           2     2       1526.84315          1.04125          0.06687
//! ```
//!
//! Every table row is a fixed number of mode labels followed by exactly three
//! signed decimals. Extraction locates the first banner line and then reads
//! the first contiguous run of rows matching that grammar. A missing banner
//! or a banner with no rows both yield an empty list.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref QUADRATIC_HEADER: Regex =
        Regex::new(r":\s+QUADRATIC\sFORCE\sCONSTANTS\sIN\sNORMAL\sMODES").unwrap();
    static ref CUBIC_HEADER: Regex =
        Regex::new(r":\s+CUBIC\sFORCE\sCONSTANTS\sIN\sNORMAL\sMODES").unwrap();
    static ref QUARTIC_HEADER: Regex =
        Regex::new(r":\s+QUARTIC\sFORCE\sCONSTANTS\sIN\sNORMAL\sMODES").unwrap();

    // " 1 1 1409.20235 1.17003 0.07515" with 2, 3 or 4 leading labels
    static ref QUADRATIC_RECORD: Regex = Regex::new(&record_pattern(2)).unwrap();
    static ref CUBIC_RECORD: Regex = Regex::new(&record_pattern(3)).unwrap();
    static ref QUARTIC_RECORD: Regex = Regex::new(&record_pattern(4)).unwrap();
}

/// Number of floating-point columns on every force-constant row.
pub const VALUES_PER_RECORD: usize = 3;

/// Builds the row grammar: `indices` word tokens then three signed decimals,
/// each preceded by whitespace, anchored at the start of the line only.
fn record_pattern(indices: usize) -> String {
    let mut pattern = String::from("^");
    for _ in 0..indices {
        pattern.push_str(r"\s+(\w+)");
    }
    for _ in 0..VALUES_PER_RECORD {
        pattern.push_str(r"\s+([+-]?\d+\.\d+)");
    }
    pattern
}

/// The force-constant tables printed by an anharmonic frequency run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Second derivatives, two mode labels per row
    Quadratic,
    /// Third derivatives, three mode labels per row
    Cubic,
    /// Fourth derivatives, four mode labels per row
    Quartic,
}

impl Section {
    /// Number of mode labels leading each row of this table.
    pub fn num_indices(self) -> usize {
        match self {
            Section::Quadratic => 2,
            Section::Cubic => 3,
            Section::Quartic => 4,
        }
    }

    fn header(self) -> &'static Regex {
        match self {
            Section::Quadratic => &QUADRATIC_HEADER,
            Section::Cubic => &CUBIC_HEADER,
            Section::Quartic => &QUARTIC_HEADER,
        }
    }

    fn record(self) -> &'static Regex {
        match self {
            Section::Quadratic => &QUADRATIC_RECORD,
            Section::Cubic => &CUBIC_RECORD,
            Section::Quartic => &QUARTIC_RECORD,
        }
    }
}

/// One row of a force-constant table.
///
/// The mode labels are kept exactly as printed (they may be alphanumeric,
/// e.g. `3a`). The three values are, in log order, the constant in frequency
/// units, in attoJ·amu⁻¹·Å⁻ⁿ and in Hartree·amu⁻¹·bohr⁻ⁿ.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForceConstant {
    /// Mode labels, 2 to 4 depending on the section
    pub indices: Vec<String>,
    /// The three constant columns
    pub values: [f64; VALUES_PER_RECORD],
}

impl ForceConstant {
    /// The reduced value in cm⁻¹ (`FI` column), used when assembling modes.
    pub fn reduced_value(&self) -> f64 {
        self.values[0]
    }
}

/// Tries to read one table row for the given section.
///
/// Returns `None` when the line does not follow the row grammar.
pub fn parse_record(line: &str, section: Section) -> Option<ForceConstant> {
    let caps = section.record().captures(line)?;
    let num_indices = section.num_indices();

    let indices: Vec<String> = (1..=num_indices)
        .map(|i| caps[i].to_string())
        .collect();

    let mut values = [0.0_f64; VALUES_PER_RECORD];
    for (k, value) in values.iter_mut().enumerate() {
        *value = caps[num_indices + 1 + k].parse().ok()?;
    }

    Some(ForceConstant { indices, values })
}

/// Extracts all rows of a force-constant table from the log lines.
///
/// Scanning starts at the first line matching the section banner (the banner
/// line itself included) and skips forward to the first row. From there rows
/// are collected until the first line that is not a row; nothing after that
/// gap is considered.
pub fn force_constants(lines: &[String], section: Section) -> Vec<ForceConstant> {
    let header = section.header();
    let start = match lines.iter().position(|line| header.is_match(line)) {
        Some(start) => start,
        None => return Vec::new(),
    };

    lines[start..]
        .iter()
        .skip_while(|line| parse_record(line, section).is_none())
        .map_while(|line| parse_record(line, section))
        .collect()
}
