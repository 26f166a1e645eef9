//! Output selection
//!
//! Decides which difficulty variants of a song are written out as MIDI.
//!
//! - Variants that agree (or `one_only` mode): a single file from the variant with the
//!   most notes, ties going to the earliest variant
//! - Variants that disagree: one file per variant

use crate::compare::Comparison;
use crate::extract::CanonicalNote;

/// Which variants to emit, as indices into the variant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Emit one file named after the song.
    Single(usize),
    /// Emit one file per variant, named after each variant.
    All(Vec<usize>),
}

/// Apply the selection policy to the extracted variants of one song.
///
/// Returns `None` when there are no variants at all.
///
/// # Example
/// ```rust
/// use deemo_midi::{select_outputs, CanonicalNote, Comparison, Selection};
///
/// let short = vec![CanonicalNote::new(0.0, 1.0, 60, 90)];
/// let long = vec![short[0], CanonicalNote::new(1.0, 2.0, 62, 90)];
/// let verdict = Comparison::LengthMismatch { left: 1, right: 2 };
///
/// let variants = [short, long];
/// assert_eq!(select_outputs(&variants, verdict, true), Some(Selection::Single(1)));
/// assert_eq!(select_outputs(&variants, verdict, false), Some(Selection::All(vec![0, 1])));
/// ```
pub fn select_outputs(
    variants: &[Vec<CanonicalNote>],
    verdict: Comparison,
    one_only: bool,
) -> Option<Selection> {
    if variants.is_empty() {
        return None;
    }

    if one_only || verdict.is_equal() {
        Some(Selection::Single(longest_variant(variants)))
    } else {
        Some(Selection::All((0..variants.len()).collect()))
    }
}

fn longest_variant(variants: &[Vec<CanonicalNote>]) -> usize {
    // max_by_key keeps the last maximum, so compare on reversed indices
    variants
        .iter()
        .enumerate()
        .rev()
        .max_by_key(|(_, notes)| notes.len())
        .map(|(index, _)| index)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(len: usize) -> Vec<CanonicalNote> {
        (0..len)
            .map(|i| CanonicalNote::new(i as f64, i as f64 + 0.5, 60, 100))
            .collect()
    }

    #[test]
    fn test_equal_variants_pick_one() {
        let variants = [variant(3), variant(3), variant(3)];
        assert_eq!(
            select_outputs(&variants, Comparison::Equal, false),
            Some(Selection::Single(0))
        );
    }

    #[test]
    fn test_one_only_picks_longest() {
        let variants = [variant(2), variant(5), variant(4)];
        let verdict = Comparison::LengthMismatch { left: 2, right: 5 };
        assert_eq!(select_outputs(&variants, verdict, true), Some(Selection::Single(1)));
    }

    #[test]
    fn test_tie_goes_to_earliest() {
        let variants = [variant(1), variant(4), variant(4)];
        let verdict = Comparison::LengthMismatch { left: 1, right: 4 };
        assert_eq!(select_outputs(&variants, verdict, true), Some(Selection::Single(1)));
    }

    #[test]
    fn test_mismatch_emits_all() {
        let variants = [variant(2), variant(2)];
        let verdict = Comparison::NotesMismatch { mismatched: 1, total: 2 };
        assert_eq!(
            select_outputs(&variants, verdict, false),
            Some(Selection::All(vec![0, 1]))
        );
    }

    #[test]
    fn test_no_variants() {
        assert_eq!(select_outputs(&[], Comparison::Equal, true), None);
    }
}
