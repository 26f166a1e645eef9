pub mod batch;
pub mod compare;
pub mod error;
pub mod extract;
pub mod midi;
pub mod record;
pub mod select;

pub use compare::{compare, compare_variants, Comparison};
pub use error::*;
pub use extract::{extract, CanonicalNote};
pub use midi::{encode, notes_to_midi};
pub use record::{parse_song, NoteRecord, SongRecord, SoundEvent};
pub use select::{select_outputs, Selection};

/// Convert a parsed chart to Standard MIDI File bytes.
/// This is the main entry point for the library.
pub fn convert(song: &SongRecord) -> Result<Vec<u8>, DeemoError> {
    let notes = extract(song)?;
    notes_to_midi(&notes)
}

/// Convert chart JSON text to Standard MIDI File bytes.
///
/// # Example
/// ```rust
/// let bytes = deemo_midi::convert_str(
///     r#"{"notes": [{"_time": 0, "sounds": [{"p": 60, "v": 100, "d": 1.0}]}]}"#,
/// )?;
/// assert_eq!(&bytes[0..4], b"MThd");
/// # Ok::<(), deemo_midi::DeemoError>(())
/// ```
pub fn convert_str(json: &str) -> Result<Vec<u8>, DeemoError> {
    convert(&parse_song(json)?)
}

/// Render extracted notes as pretty-printed JSON, one object per note.
pub fn notes_to_json(notes: &[CanonicalNote]) -> Result<String, DeemoError> {
    Ok(serde_json::to_string_pretty(notes)?)
}
