//! # Chart Record Types
//!
//! This module defines the input side of the converter: a Deemo chart as it is stored
//! on disk, after JSON parsing but before any normalization.
//!
//! ## Type Hierarchy
//! ```text
//! SongRecord
//!   └── Vec<NoteRecord>
//!         ├── time: Option<f64>          ("_time", base time in seconds)
//!         └── sounds: Option<Vec<SoundEvent>>
//!               ├── w: Option<f64>       (onset delay after `_time`)
//!               ├── d: Option<f64>       (duration; inherited when absent)
//!               ├── p: Option<i64>       (pitch, required)
//!               └── v: Option<i64>       (velocity, required, may be out of range)
//! ```
//!
//! Every field is kept optional exactly as it appears in the file. Deciding what a
//! missing value means is the job of [`crate::extract`], which also reports a missing
//! `p` or `v` with the position of the offending sound.
//!
//! Charts carry many other keys (`$id`, `pos`, `size`, `speed`, ...). They are ignored.

use serde::Deserialize;

use crate::error::DeemoError;

/// A whole chart: one difficulty variant of a song.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SongRecord {
    pub notes: Vec<NoteRecord>,
}

/// One entry of the chart's `notes` array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoteRecord {
    /// Base time in seconds. Early notes in some charts omit it, meaning zero.
    #[serde(rename = "_time", default)]
    pub time: Option<f64>,
    /// `None` both when the key is absent and when it is `null`.
    #[serde(default)]
    pub sounds: Option<Vec<SoundEvent>>,
}

/// A single piano sound triggered by a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct SoundEvent {
    #[serde(default)]
    pub w: Option<f64>,
    #[serde(default)]
    pub d: Option<f64>,
    #[serde(default)]
    pub p: Option<i64>,
    #[serde(default)]
    pub v: Option<i64>,
}

impl NoteRecord {
    pub fn new(time: Option<f64>, sounds: Option<Vec<SoundEvent>>) -> Self {
        Self { time, sounds }
    }
}

impl SoundEvent {
    /// A sound with pitch and velocity and nothing else.
    pub fn new(p: i64, v: i64) -> Self {
        Self {
            w: None,
            d: None,
            p: Some(p),
            v: Some(v),
        }
    }

    pub fn with_delay(mut self, w: f64) -> Self {
        self.w = Some(w);
        self
    }

    pub fn with_duration(mut self, d: f64) -> Self {
        self.d = Some(d);
        self
    }
}

/// Parse chart JSON text into a [`SongRecord`].
///
/// Anything that does not have the chart shape (no `notes` array, a string where a
/// number belongs, ...) is reported as [`DeemoError::MalformedRecord`].
///
/// # Example
/// ```rust
/// use deemo_midi::parse_song;
///
/// let song = parse_song(r#"{"notes": [{"_time": 0.5, "sounds": null}, {"pos": 1.2}]}"#)?;
/// assert_eq!(song.notes.len(), 2);
/// assert_eq!(song.notes[0].time, Some(0.5));
/// assert!(song.notes[0].sounds.is_none());
/// assert!(song.notes[1].time.is_none());
/// # Ok::<(), deemo_midi::DeemoError>(())
/// ```
pub fn parse_song(json: &str) -> Result<SongRecord, DeemoError> {
    serde_json::from_str(json).map_err(|e| DeemoError::MalformedRecord {
        record: None,
        sound: None,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_sound() {
        let song = parse_song(
            r#"{"notes": [{"$id": "1", "_time": 2.25, "sounds": [{"w": 0.1, "d": 0.5, "p": 64, "v": 80}]}]}"#,
        )
        .unwrap();
        let sound = song.notes[0].sounds.as_ref().unwrap()[0];
        assert_eq!(sound, SoundEvent::new(64, 80).with_delay(0.1).with_duration(0.5));
        assert_eq!(song.notes[0].time, Some(2.25));
    }

    #[test]
    fn test_parse_missing_optional_fields() {
        let song = parse_song(r#"{"notes": [{"sounds": [{"p": 60, "v": 100}]}]}"#).unwrap();
        let note = &song.notes[0];
        assert!(note.time.is_none());
        let sound = note.sounds.as_ref().unwrap()[0];
        assert!(sound.w.is_none());
        assert!(sound.d.is_none());
    }

    #[test]
    fn test_parse_keeps_missing_pitch_for_extractor() {
        let song = parse_song(r#"{"notes": [{"sounds": [{"v": 100, "d": 1}]}]}"#).unwrap();
        assert!(song.notes[0].sounds.as_ref().unwrap()[0].p.is_none());
    }

    #[test]
    fn test_parse_wrong_shape_is_malformed() {
        let result = parse_song(r#"{"notes": [{"sounds": [{"p": "C4", "v": 100}]}]}"#);
        assert!(matches!(
            result,
            Err(DeemoError::MalformedRecord { record: None, .. })
        ));
    }

    #[test]
    fn test_parse_without_notes_is_malformed() {
        assert!(matches!(
            parse_song(r#"{"speed": 5}"#),
            Err(DeemoError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_parse_integer_times() {
        let song = parse_song(r#"{"notes": [{"_time": 3, "sounds": [{"p": 60, "v": 1, "d": 1}]}]}"#).unwrap();
        assert_eq!(song.notes[0].time, Some(3.0));
    }
}
