//! Mode numbering between the anharmonic (A) and harmonic (H) schemes.
//!
//! The anharmonic module of Gaussian labels normal modes with its own
//! numbering (symmetry-ordered, possibly with degenerate suffixes such as
//! `3a`/`3b`), while the force-constant machinery downstream wants the plain
//! integer harmonic numbering. The log prints the correspondence in its
//! `Input/Output information` block:
//!
//! ```text
//!  Input/Output information
//!  ...
//!           (H) |    1 |    2 |    3 |    4
//!           (A) |    1 |    2 |   3a |   3b
//! ```

use log::{debug, warn};
use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IO_INFO_HEADER: Regex = Regex::new(r"Input/Output\sinformation").unwrap();
    static ref H_ROW: Regex = Regex::new(r"\s+\(H\)\s+\|").unwrap();
    static ref A_ROW: Regex = Regex::new(r"\s+\(A\)\s+\|").unwrap();
}

/// Mapping from an A-numbering label to its H-numbering integer.
pub type Numbering = BTreeMap<String, u32>;

/// Splits a numbering row on `|`, dropping empty cells and the row label.
fn row_tokens(line: &str, label: &str) -> Vec<String> {
    line.split('|')
        .filter(|cell| !cell.is_empty() && !cell.contains(label))
        .map(|cell| cell.trim().to_string())
        .collect()
}

/// Reads the A → H mode numbering from the log.
///
/// Looks for the first `Input/Output information` line, then for an `(H)`
/// row and an `(A)` row after it. Once both have been seen the columns are
/// paired by position and scanning stops. Returns an empty map when the
/// block or either row is missing.
pub fn a_to_h_numbering(lines: &[String]) -> Numbering {
    let mut numbering = Numbering::new();

    let mut found_section = false;
    let mut h_nums: Option<Vec<String>> = None;
    let mut a_nums: Option<Vec<String>> = None;

    for line in lines {
        if !found_section {
            if IO_INFO_HEADER.is_match(line) {
                debug!("{}", line);
                found_section = true;
            }
            continue;
        }

        if H_ROW.is_match(line) {
            debug!("{}", line);
            h_nums = Some(row_tokens(line, "(H)"));
        } else if A_ROW.is_match(line) {
            debug!("{}", line);
            a_nums = Some(row_tokens(line, "(A)"));
        }

        if let (Some(h), Some(a)) = (&h_nums, &a_nums) {
            if h.len() != a.len() {
                warn!(
                    "Mode numbering rows differ in length: {} (H) vs {} (A)",
                    h.len(),
                    a.len()
                );
            }
            for (a_num, h_num) in a.iter().zip(h.iter()) {
                match h_num.parse::<u32>() {
                    Ok(value) => {
                        numbering.insert(a_num.clone(), value);
                    }
                    Err(_) => warn!("Skipping non-integer H mode number '{}'", h_num),
                }
            }
            break;
        }
    }

    numbering
}

/// Largest H number in the map, or `None` for an empty map.
pub fn max_h_value(numbering: &Numbering) -> Option<u32> {
    numbering.values().copied().max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_lines(text: &str) -> Vec<String> {
        text.split('\n').map(String::from).collect()
    }

    #[test]
    fn test_aligned_rows() {
        let log = to_lines(
            " Input/Output information\n \
             ---------------------\n          \
             (H) |    1 |    2 |    3\n          \
             (A) |   1a |   1b |    2a\n",
        );
        let a2h = a_to_h_numbering(&log);
        assert_eq!(a2h.len(), 3);
        assert_eq!(a2h["1a"], 1);
        assert_eq!(a2h["1b"], 2);
        assert_eq!(a2h["2a"], 3);
        assert_eq!(max_h_value(&a2h), Some(3));
    }

    #[test]
    fn test_rows_before_section_are_ignored() {
        let log = to_lines(
            "     (H) |    1 |    2\n     \
             (A) |    2 |    1\n \
             Input/Output information\n",
        );
        assert!(a_to_h_numbering(&log).is_empty());
    }

    #[test]
    fn test_missing_a_row_is_empty() {
        let log = to_lines(" Input/Output information\n     (H) |    1 |    2\n");
        let a2h = a_to_h_numbering(&log);
        assert!(a2h.is_empty());
        assert_eq!(max_h_value(&a2h), None);
    }

    #[test]
    fn test_only_first_block_is_used() {
        let log = to_lines(
            " Input/Output information\n     \
             (H) |    1 |    2\n     \
             (A) |    a |    b\n     \
             (H) |    5 |    6\n     \
             (A) |    c |    d\n",
        );
        let a2h = a_to_h_numbering(&log);
        assert_eq!(a2h.len(), 2);
        assert_eq!(a2h["a"], 1);
        assert!(!a2h.contains_key("c"));
    }

    #[test]
    fn test_a_row_before_h_row() {
        let log = to_lines(
            " Input/Output information\n     \
             (A) |   3a |   3b\n     \
             (H) |    4 |    5\n",
        );
        let a2h = a_to_h_numbering(&log);
        assert_eq!(a2h.len(), 2);
        assert_eq!(a2h["3a"], 4);
        assert_eq!(a2h["3b"], 5);
    }
}
