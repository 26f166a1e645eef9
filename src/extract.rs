//! Note extraction
//!
//! Turns a parsed chart into a flat list of [`CanonicalNote`]s with absolute times.
//!
//! ## Rules
//! - Records without sounds (key absent or `null`) contribute nothing
//! - A missing `_time` means 0 seconds
//! - `on_time = _time + w` (or just `_time` when `w` is absent)
//! - A missing `d` reuses the duration of the previously extracted note, in source
//!   order; the very first sound must carry its own `d`
//! - Velocities outside 0..=127 are silenced to 0
//! - The result is stably sorted by `(on_time, pitch)`
//!
//! The previous duration is threaded through the extraction fold as an accumulator,
//! so it always refers to the last note *emitted*, not the last sound *seen*.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::DeemoError;
use crate::record::{SongRecord, SoundEvent};

/// Highest velocity MIDI can carry.
pub const MAX_VELOCITY: i64 = 127;

/// A normalized note: absolute seconds, MIDI-range velocity.
///
/// Invariant: `on_time <= off_time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalNote {
    pub on_time: f64,
    pub off_time: f64,
    pub pitch: i64,
    pub velocity: u8,
}

impl CanonicalNote {
    pub fn new(on_time: f64, off_time: f64, pitch: i64, velocity: u8) -> Self {
        Self {
            on_time,
            off_time,
            pitch,
            velocity,
        }
    }

    pub fn duration(&self) -> f64 {
        self.off_time - self.on_time
    }
}

/// Extract the canonical notes of a chart.
///
/// # Errors
/// - [`DeemoError::MissingDuration`] when a sound without `d` comes before any note
/// - [`DeemoError::MalformedRecord`] when `p` or `v` is missing, or `d` is negative
///
/// # Example
/// ```rust
/// use deemo_midi::{extract, parse_song, CanonicalNote};
///
/// let song = parse_song(r#"{"notes": [
///     {"_time": 1.0, "sounds": [{"p": 64, "v": 90, "d": 0.5}]},
///     {"_time": 0.0, "sounds": [{"p": 60, "v": 200, "w": 0.25}]}
/// ]}"#)?;
///
/// let notes = extract(&song)?;
/// assert_eq!(notes, vec![
///     CanonicalNote::new(0.25, 0.75, 60, 0), // inherited duration, silenced velocity
///     CanonicalNote::new(1.0, 1.5, 64, 90),
/// ]);
/// # Ok::<(), deemo_midi::DeemoError>(())
/// ```
pub fn extract(song: &SongRecord) -> Result<Vec<CanonicalNote>, DeemoError> {
    let (mut notes, _) = song
        .notes
        .iter()
        .enumerate()
        .filter_map(|(record, note)| {
            note.sounds
                .as_ref()
                .map(|sounds| (record, note.time.unwrap_or(0.0), sounds))
        })
        .flat_map(|(record, base_time, sounds)| {
            sounds
                .iter()
                .enumerate()
                .map(move |(sound, event)| (record, sound, base_time, event))
        })
        .try_fold(
            (Vec::new(), None),
            |(mut notes, last_duration), (record, sound, base_time, event)| {
                let note = extract_sound(event, base_time, last_duration, record, sound)?;
                let duration = note.duration();
                notes.push(note);
                Ok::<_, DeemoError>((notes, Some(duration)))
            },
        )?;

    // Vec::sort_by is stable, so equal (on_time, pitch) keep source order
    notes.sort_by(|a, b| {
        a.on_time
            .partial_cmp(&b.on_time)
            .unwrap_or(Ordering::Equal)
            .then(a.pitch.cmp(&b.pitch))
    });

    Ok(notes)
}

fn extract_sound(
    event: &SoundEvent,
    base_time: f64,
    last_duration: Option<f64>,
    record: usize,
    sound: usize,
) -> Result<CanonicalNote, DeemoError> {
    let on_time = base_time + event.w.unwrap_or(0.0);

    let duration = match event.d {
        Some(d) if d < 0.0 => {
            return Err(DeemoError::malformed(
                record,
                Some(sound),
                format!("negative duration {}", d),
            ))
        }
        Some(d) => d,
        None => last_duration.ok_or(DeemoError::MissingDuration { record, sound })?,
    };

    let pitch = event
        .p
        .ok_or_else(|| DeemoError::malformed(record, Some(sound), "missing field `p`"))?;
    let velocity = event
        .v
        .ok_or_else(|| DeemoError::malformed(record, Some(sound), "missing field `v`"))?;

    Ok(CanonicalNote::new(
        on_time,
        on_time + duration,
        pitch,
        clamp_velocity(velocity),
    ))
}

/// Velocities MIDI cannot carry are treated as silent rather than saturated.
fn clamp_velocity(v: i64) -> u8 {
    if (0..=MAX_VELOCITY).contains(&v) {
        v as u8
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NoteRecord;

    fn song(notes: Vec<NoteRecord>) -> SongRecord {
        SongRecord { notes }
    }

    #[test]
    fn test_single_sound() {
        let s = song(vec![NoteRecord::new(
            Some(0.0),
            Some(vec![SoundEvent::new(60, 100).with_duration(1.0)]),
        )]);
        assert_eq!(extract(&s).unwrap(), vec![CanonicalNote::new(0.0, 1.0, 60, 100)]);
    }

    #[test]
    fn test_records_without_sounds_are_skipped() {
        let s = song(vec![
            NoteRecord::new(Some(0.5), None),
            NoteRecord::new(Some(1.0), Some(vec![SoundEvent::new(62, 50).with_duration(0.5)])),
            NoteRecord::new(None, None),
        ]);
        let notes = extract(&s).unwrap();
        assert_eq!(notes, vec![CanonicalNote::new(1.0, 1.5, 62, 50)]);
    }

    #[test]
    fn test_empty_sounds_list_contributes_nothing() {
        let s = song(vec![NoteRecord::new(Some(1.0), Some(vec![]))]);
        assert!(extract(&s).unwrap().is_empty());
    }

    #[test]
    fn test_missing_time_defaults_to_zero() {
        let s = song(vec![NoteRecord::new(
            None,
            Some(vec![SoundEvent::new(60, 10).with_delay(0.3).with_duration(0.2)]),
        )]);
        let notes = extract(&s).unwrap();
        assert_eq!(notes[0].on_time, 0.3);
        assert!((notes[0].off_time - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_delay_is_relative_to_base_time() {
        let s = song(vec![NoteRecord::new(
            Some(2.0),
            Some(vec![SoundEvent::new(60, 10).with_delay(0.5).with_duration(1.0)]),
        )]);
        assert_eq!(extract(&s).unwrap(), vec![CanonicalNote::new(2.5, 3.5, 60, 10)]);
    }

    #[test]
    fn test_velocity_clamping() {
        let sounds = vec![
            SoundEvent::new(60, -1).with_duration(1.0),
            SoundEvent::new(61, 0),
            SoundEvent::new(62, 127),
            SoundEvent::new(63, 128),
            SoundEvent::new(64, 64),
            SoundEvent::new(65, -300),
        ];
        let s = song(vec![NoteRecord::new(Some(0.0), Some(sounds))]);
        let velocities: Vec<u8> = extract(&s).unwrap().iter().map(|n| n.velocity).collect();
        assert_eq!(velocities, vec![0, 0, 127, 0, 64, 0]);
    }

    #[test]
    fn test_duration_inherited_across_records() {
        let s = song(vec![
            NoteRecord::new(Some(0.0), Some(vec![SoundEvent::new(60, 100).with_duration(0.25)])),
            NoteRecord::new(Some(1.0), None),
            NoteRecord::new(Some(2.0), Some(vec![SoundEvent::new(67, 100)])),
        ]);
        let notes = extract(&s).unwrap();
        assert_eq!(notes[1], CanonicalNote::new(2.0, 2.25, 67, 100));
    }

    #[test]
    fn test_duration_inherited_from_emission_order_not_sorted_order() {
        // The later record in source order sounds earlier; inheritance still follows source order.
        let s = song(vec![
            NoteRecord::new(Some(5.0), Some(vec![SoundEvent::new(60, 100).with_duration(2.0)])),
            NoteRecord::new(Some(1.0), Some(vec![SoundEvent::new(60, 100).with_duration(0.5)])),
            NoteRecord::new(Some(3.0), Some(vec![SoundEvent::new(60, 100)])),
        ]);
        let notes = extract(&s).unwrap();
        assert_eq!(notes[1], CanonicalNote::new(3.0, 3.5, 60, 100));
    }

    #[test]
    fn test_first_sound_without_duration_fails() {
        let s = song(vec![
            NoteRecord::new(Some(0.0), None),
            NoteRecord::new(Some(1.0), Some(vec![SoundEvent::new(60, 100)])),
        ]);
        assert!(matches!(
            extract(&s),
            Err(DeemoError::MissingDuration { record: 1, sound: 0 })
        ));
    }

    #[test]
    fn test_missing_pitch_is_malformed() {
        let mut event = SoundEvent::new(60, 100).with_duration(1.0);
        event.p = None;
        let s = song(vec![NoteRecord::new(Some(0.0), Some(vec![event]))]);
        assert!(matches!(
            extract(&s),
            Err(DeemoError::MalformedRecord { record: Some(0), sound: Some(0), .. })
        ));
    }

    #[test]
    fn test_missing_velocity_is_malformed() {
        let mut event = SoundEvent::new(60, 100).with_duration(1.0);
        event.v = None;
        let s = song(vec![NoteRecord::new(
            Some(0.0),
            Some(vec![SoundEvent::new(50, 1).with_duration(1.0), event]),
        )]);
        assert!(matches!(
            extract(&s),
            Err(DeemoError::MalformedRecord { record: Some(0), sound: Some(1), .. })
        ));
    }

    #[test]
    fn test_negative_duration_is_malformed() {
        let s = song(vec![NoteRecord::new(
            Some(1.0),
            Some(vec![SoundEvent::new(60, 100).with_duration(-0.5)]),
        )]);
        assert!(matches!(extract(&s), Err(DeemoError::MalformedRecord { .. })));
    }

    #[test]
    fn test_sorted_by_time_then_pitch() {
        let s = song(vec![
            NoteRecord::new(Some(1.0), Some(vec![SoundEvent::new(72, 1).with_duration(1.0)])),
            NoteRecord::new(
                Some(0.0),
                Some(vec![SoundEvent::new(67, 2), SoundEvent::new(60, 3)]),
            ),
        ]);
        let keys: Vec<(f64, i64)> = extract(&s).unwrap().iter().map(|n| (n.on_time, n.pitch)).collect();
        assert_eq!(keys, vec![(0.0, 60), (0.0, 67), (1.0, 72)]);
    }

    #[test]
    fn test_sort_is_stable_for_identical_keys() {
        let s = song(vec![
            NoteRecord::new(Some(0.0), Some(vec![SoundEvent::new(60, 10).with_duration(1.0)])),
            NoteRecord::new(Some(0.0), Some(vec![SoundEvent::new(60, 20).with_duration(2.0)])),
            NoteRecord::new(Some(0.0), Some(vec![SoundEvent::new(60, 30).with_duration(3.0)])),
        ]);
        let velocities: Vec<u8> = extract(&s).unwrap().iter().map(|n| n.velocity).collect();
        assert_eq!(velocities, vec![10, 20, 30]);
    }

    #[test]
    fn test_pitch_passes_through_unchanged() {
        let s = song(vec![NoteRecord::new(
            Some(0.0),
            Some(vec![SoundEvent::new(200, 10).with_duration(1.0)]),
        )]);
        assert_eq!(extract(&s).unwrap()[0].pitch, 200);
    }
}
