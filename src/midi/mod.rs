//! # MIDI Module
//!
//! Encode canonical notes as a single-track, fixed-tempo MIDI event stream and
//! serialize it as a Standard MIDI File.
//!
//! ## Sub-modules
//! - `types` - EncoderConfig, TrackEvent, TrackMessage definitions
//! - `encoder` - Seconds to ticks, event ordering, delta conversion
//! - `writer` - Standard MIDI File serialization via `midly`
//!
//! ## Track Layout
//! ```text
//! delta 0   Tempo (500000 us/beat = 120 bpm)
//! delta 0   Program change (program 0)
//! delta ..  Note events, note-offs as velocity 0
//! delta 1   End of track
//! ```
//!
//! ## Event Ordering
//! All note-on and note-off events are pooled and sorted by
//! `(tick, pitch, velocity)`. A note-off (velocity 0) therefore always precedes a
//! note-on of the same pitch on the same tick, and chords come out in ascending
//! pitch order whatever order the notes arrived in. Equal input always gives
//! byte-identical output.
//!
//! ## Example
//! ```rust
//! use deemo_midi::midi::{encode, TrackMessage};
//! use deemo_midi::CanonicalNote;
//!
//! let events = encode(&[CanonicalNote::new(0.5, 1.0, 60, 100)])?;
//!
//! let deltas: Vec<u32> = events.iter().map(|e| e.delta).collect();
//! assert_eq!(deltas, vec![0, 0, 480, 480, 1]);
//! assert_eq!(events[2].message, TrackMessage::Note { pitch: 60, velocity: 100 });
//! assert_eq!(events[3].message, TrackMessage::Note { pitch: 60, velocity: 0 });
//! # Ok::<(), deemo_midi::DeemoError>(())
//! ```

mod encoder;
mod types;
mod writer;


pub use encoder::{encode, encode_with, seconds_to_ticks};
pub use types::{
    EncoderConfig, TrackEvent, TrackMessage, DEFAULT_PROGRAM, END_OF_TRACK_DELTA,
    MICROSECONDS_PER_BEAT, TICKS_PER_BEAT,
};
pub use writer::{notes_to_midi, write_smf};
