//! Cross-variant note comparison
//!
//! Difficulty variants of one song share the same piano track, so their canonical
//! note lists are expected to match. Times are compared with a relative tolerance
//! because charts are authored per difficulty and accumulate float noise.

use std::fmt;

use crate::extract::CanonicalNote;

/// Relative tolerance for on/off times.
pub const RELATIVE_TOLERANCE: f64 = 1e-5;

/// Verdict of comparing two note lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    /// Different note counts; notes were not compared.
    LengthMismatch { left: usize, right: usize },
    /// Same count, but `mismatched` of `total` notes differ.
    NotesMismatch { mismatched: usize, total: usize },
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        matches!(self, Comparison::Equal)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equal => write!(f, "Notes are equal."),
            Comparison::LengthMismatch { left, right } => {
                write!(f, "Length mismatch: {} != {}", left, right)
            }
            Comparison::NotesMismatch { mismatched, total } => write!(
                f,
                "Notes mismatch: {}/{} ({:.2}%) notes.",
                mismatched,
                total,
                percent(*mismatched, *total)
            ),
        }
    }
}

pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `|a - b| <= 1e-5 * max(|a|, |b|)`; no absolute floor, so a time of exactly zero
/// only matches zero.
pub fn is_close(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= RELATIVE_TOLERANCE * a.abs().max(b.abs())
}

fn notes_match(a: &CanonicalNote, b: &CanonicalNote) -> bool {
    is_close(a.on_time, b.on_time)
        && is_close(a.off_time, b.off_time)
        && a.pitch == b.pitch
        && a.velocity == b.velocity
}

/// Compare two extracted note lists index by index.
///
/// # Example
/// ```rust
/// use deemo_midi::{compare, CanonicalNote, Comparison};
///
/// let easy = vec![CanonicalNote::new(1.0, 2.0, 60, 90)];
/// let hard = vec![CanonicalNote::new(1.000001, 2.0, 60, 90)];
/// assert_eq!(compare(&easy, &hard), Comparison::Equal);
///
/// let extra = vec![easy[0], CanonicalNote::new(3.0, 4.0, 62, 90)];
/// assert_eq!(
///     compare(&easy, &extra),
///     Comparison::LengthMismatch { left: 1, right: 2 }
/// );
/// ```
pub fn compare(a: &[CanonicalNote], b: &[CanonicalNote]) -> Comparison {
    if a.len() != b.len() {
        return Comparison::LengthMismatch {
            left: a.len(),
            right: b.len(),
        };
    }

    let mismatched = a.iter().zip(b).filter(|(x, y)| !notes_match(x, y)).count();

    if mismatched > 0 {
        Comparison::NotesMismatch {
            mismatched,
            total: a.len(),
        }
    } else {
        Comparison::Equal
    }
}

/// Compare every variant with the next one and return the first verdict that is not
/// [`Comparison::Equal`]. Fewer than two variants are trivially equal.
pub fn compare_variants(variants: &[Vec<CanonicalNote>]) -> Comparison {
    variants
        .windows(2)
        .map(|pair| compare(&pair[0], &pair[1]))
        .find(|verdict| !verdict.is_equal())
        .unwrap_or(Comparison::Equal)
}
