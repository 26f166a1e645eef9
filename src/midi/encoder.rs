//! Note to MIDI event encoding
//!
//! Converts canonical notes (float seconds) to a delta-tick event stream.

use crate::error::DeemoError;
use crate::extract::CanonicalNote;

use super::types::{AbsoluteEvent, EncoderConfig, TrackEvent, TrackMessage};

/// Highest MIDI key number.
const MAX_PITCH: i64 = 127;

/// Convert seconds to the nearest tick.
///
/// Divides by the length of one tick in seconds, then rounds half to even, so a
/// time exactly between two ticks lands on the even one.
///
/// # Example
/// ```rust
/// use deemo_midi::midi::{seconds_to_ticks, EncoderConfig};
///
/// let config = EncoderConfig::default();
/// assert_eq!(seconds_to_ticks(0.5, &config), 480);
/// assert_eq!(seconds_to_ticks(1.0, &config), 960);
/// ```
pub fn seconds_to_ticks(seconds: f64, config: &EncoderConfig) -> i64 {
    let seconds_per_tick =
        config.microseconds_per_beat as f64 * 1e-6 / config.ticks_per_beat as f64;
    (seconds / seconds_per_tick).round_ties_even() as i64
}

/// Encode notes with the fixed 120 bpm / 480 ticks-per-beat configuration.
///
/// See [`encode_with`].
pub fn encode(notes: &[CanonicalNote]) -> Result<Vec<TrackEvent>, DeemoError> {
    encode_with(notes, &EncoderConfig::default())
}

/// Encode notes as a complete track: tempo, program change, the sorted note
/// events in delta ticks, and the end-of-track marker.
///
/// # Errors
/// - [`DeemoError::PitchOutOfRange`] for a pitch outside 0..=127
/// - [`DeemoError::NegativeTick`] for a note that starts or ends before zero
pub fn encode_with(
    notes: &[CanonicalNote],
    config: &EncoderConfig,
) -> Result<Vec<TrackEvent>, DeemoError> {
    let mut pending = Vec::with_capacity(notes.len() * 2);
    for note in notes {
        let pitch = midi_pitch(note.pitch)?;
        pending.push(AbsoluteEvent {
            tick: absolute_tick(note.on_time, config)?,
            pitch,
            velocity: note.velocity,
        });
        pending.push(AbsoluteEvent {
            tick: absolute_tick(note.off_time, config)?,
            pitch,
            velocity: 0,
        });
    }

    // (tick, pitch, velocity): offs before ons at the same tick and pitch
    pending.sort();

    let mut events = Vec::with_capacity(pending.len() + 3);
    events.push(TrackEvent::new(0, TrackMessage::Tempo(config.microseconds_per_beat)));
    events.push(TrackEvent::new(0, TrackMessage::ProgramChange(config.program)));
    events.extend(to_delta_events(&pending));
    events.push(TrackEvent::new(config.end_of_track_delta, TrackMessage::EndOfTrack));

    Ok(events)
}

/// Convert sorted absolute ticks to deltas. The first delta is its absolute tick.
fn to_delta_events(sorted: &[AbsoluteEvent]) -> impl Iterator<Item = TrackEvent> + '_ {
    sorted.iter().scan(0u32, |previous, event| {
        let delta = event.tick - *previous;
        *previous = event.tick;
        Some(TrackEvent::new(
            delta,
            TrackMessage::Note {
                pitch: event.pitch,
                velocity: event.velocity,
            },
        ))
    })
}

fn absolute_tick(seconds: f64, config: &EncoderConfig) -> Result<u32, DeemoError> {
    let ticks = seconds_to_ticks(seconds, config);
    if ticks < 0 {
        return Err(DeemoError::NegativeTick { seconds });
    }
    u32::try_from(ticks)
        .map_err(|_| DeemoError::Midi(format!("Event at {}s is too late to encode", seconds)))
}

fn midi_pitch(pitch: i64) -> Result<u8, DeemoError> {
    if (0..=MAX_PITCH).contains(&pitch) {
        Ok(pitch as u8)
    } else {
        Err(DeemoError::PitchOutOfRange { pitch })
    }
}
