//! Path utilities: lossy string conversion and natural ordering of file names.
//!
//! Natural ordering compares embedded runs of ASCII digits by magnitude, so
//! `page2.png` sorts before `page10.png`. It is locale independent and total:
//! names that compare equal (e.g. `01.png` and `1.png`) fall back to a plain
//! string comparison, and callers sorting paths break remaining ties on the
//! full path.

use std::cmp::Ordering;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Splits a name into alternating digit and non-digit runs.
    static ref NATURAL_CHUNK_REGEX: Regex = Regex::new(r"[0-9]+|[^0-9]+").unwrap();
}

/// Converts a path to a string with fallback to lossy conversion.
pub fn path_to_string_lossy(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Gets the file name from a path with fallback to lossy conversion.
pub fn get_file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Gets the file stem (name without the last extension) with lossy conversion.
pub fn get_file_stem_lossy(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Compares two digit runs by numeric value without parsing them into integers,
/// so arbitrarily long runs never overflow.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
}

/// Natural ("human") comparison of two strings.
///
/// Digit runs compare by magnitude and sort before text runs at the same
/// position; text runs compare by code point. When every chunk is equal by
/// value, the shorter chunk list wins, then the raw strings decide.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a_chunks = NATURAL_CHUNK_REGEX.find_iter(a).map(|m| m.as_str());
    let mut b_chunks = NATURAL_CHUNK_REGEX.find_iter(b).map(|m| m.as_str());

    loop {
        let ordering = match (a_chunks.next(), b_chunks.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let x_digits = x.as_bytes()[0].is_ascii_digit();
                let y_digits = y.as_bytes()[0].is_ascii_digit();
                match (x_digits, y_digits) {
                    (true, true) => compare_digit_runs(x, y),
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => x.cmp(y),
                }
            }
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

/// Orders paths naturally by file name, breaking ties on the full path string.
pub fn compare_paths_natural(a: &Path, b: &Path) -> Ordering {
    natural_cmp(&get_file_name_lossy(a), &get_file_name_lossy(b))
        .then_with(|| path_to_string_lossy(a).cmp(&path_to_string_lossy(b)))
}
