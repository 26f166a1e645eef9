//! # Error Types
//!
//! This module defines all error types for the Deemo to MIDI converter.
//!
//! Extraction errors carry the position of the offending sound (note record index and
//! sound index within that record) so a broken chart can be fixed by hand.
//!
//! ## Error Types
//! - `MissingDuration` - A sound has no `d` and there is no earlier note to inherit from
//! - `MalformedRecord` - Required fields are missing or have the wrong shape
//! - `PitchOutOfRange` / `NegativeTick` - The notes cannot be expressed as MIDI events
//! - `Midi` - The MIDI container could not be written
//! - `Io` - Reading a chart or writing a MIDI file failed
//!
//! Out-of-range velocities are *not* errors; extraction silences them.
//!
//! ## Usage
//! ```rust
//! use deemo_midi::{convert_str, DeemoError};
//!
//! let chart = r#"{"notes": [{"_time": 1.0, "sounds": [{"p": 60, "v": 90}]}]}"#;
//!
//! match convert_str(chart) {
//!     Ok(_) => unreachable!("the first sound has nothing to inherit a duration from"),
//!     Err(DeemoError::MissingDuration { record, sound }) => {
//!         assert_eq!((record, sound), (0, 0));
//!     }
//!     Err(e) => panic!("unexpected error: {}", e),
//! }
//! ```

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeemoError {
    /// A sound without `d` appeared before any note had been extracted.
    ///
    /// # Example
    /// ```
    /// # use deemo_midi::DeemoError;
    /// let err = DeemoError::MissingDuration { record: 0, sound: 2 };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Missing duration at note 0, sound 2: no previous note to inherit from"
    /// );
    /// ```
    #[error("Missing duration at note {record}, sound {sound}: no previous note to inherit from")]
    MissingDuration { record: usize, sound: usize },

    /// A record is missing a required field or is shaped wrongly.
    ///
    /// Position is `None` when the problem was found while parsing the JSON text
    /// rather than while walking the parsed records.
    #[error("Malformed record{}: {message}", format_position(.record, .sound))]
    MalformedRecord {
        record: Option<usize>,
        sound: Option<usize>,
        message: String,
    },

    /// A pitch that MIDI cannot represent (outside 0..=127).
    #[error("Pitch {pitch} is outside the MIDI range 0..=127")]
    PitchOutOfRange { pitch: i64 },

    /// An event that would land before the start of the track.
    #[error("Event at {seconds}s falls before the start of the track")]
    NegativeTick { seconds: f64 },

    #[error("MIDI write error: {0}")]
    Midi(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeemoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeemoError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(record: usize, sound: Option<usize>, message: impl Into<String>) -> Self {
        DeemoError::MalformedRecord {
            record: Some(record),
            sound,
            message: message.into(),
        }
    }
}

fn format_position(record: &Option<usize>, sound: &Option<usize>) -> String {
    match (record, sound) {
        (Some(r), Some(s)) => format!(" at note {}, sound {}", r, s),
        (Some(r), None) => format!(" at note {}", r),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_with_position() {
        let err = DeemoError::malformed(3, Some(1), "missing field `p`");
        assert_eq!(err.to_string(), "Malformed record at note 3, sound 1: missing field `p`");
    }

    #[test]
    fn test_malformed_message_without_position() {
        let err = DeemoError::MalformedRecord {
            record: None,
            sound: None,
            message: "expected a map".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed record: expected a map");
    }
}
