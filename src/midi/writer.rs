//! Standard MIDI File serialization

use midly::num::{u15, u24, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};

use crate::error::DeemoError;
use crate::extract::CanonicalNote;

use super::encoder::encode_with;
use super::types::{EncoderConfig, TrackEvent, TrackMessage};

/// Largest delta a MIDI variable-length quantity can hold.
const MAX_DELTA: u32 = 0x0FFF_FFFF;

const MAX_TEMPO: u32 = 0x00FF_FFFF;

const MAX_TICKS_PER_BEAT: u16 = 0x7FFF;

const MAX_DATA_BYTE: u8 = 0x7F;

/// Serialize an encoded track as a format 0 Standard MIDI File.
///
/// Every event goes on channel 0.
pub fn write_smf(events: &[TrackEvent], config: &EncoderConfig) -> Result<Vec<u8>, DeemoError> {
    if config.ticks_per_beat == 0 || config.ticks_per_beat > MAX_TICKS_PER_BEAT {
        return Err(DeemoError::Midi(format!(
            "Invalid resolution of {} ticks per beat",
            config.ticks_per_beat
        )));
    }

    let track = events
        .iter()
        .map(to_midly_event)
        .collect::<Result<Vec<_>, _>>()?;

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(u15::new(config.ticks_per_beat)),
        },
        tracks: vec![track],
    };

    let mut out = Vec::new();
    smf.write(&mut out)
        .map_err(|e| DeemoError::Midi(format!("Failed to write MIDI: {}", e)))?;
    Ok(out)
}

/// Encode notes with the default configuration and serialize them.
///
/// # Example
/// ```rust
/// use deemo_midi::midi::notes_to_midi;
/// use deemo_midi::CanonicalNote;
///
/// let bytes = notes_to_midi(&[CanonicalNote::new(0.0, 1.0, 60, 100)])?;
/// assert_eq!(&bytes[0..4], b"MThd");
/// # Ok::<(), deemo_midi::DeemoError>(())
/// ```
pub fn notes_to_midi(notes: &[CanonicalNote]) -> Result<Vec<u8>, DeemoError> {
    let config = EncoderConfig::default();
    let events = encode_with(notes, &config)?;
    write_smf(&events, &config)
}

fn to_midly_event(event: &TrackEvent) -> Result<midly::TrackEvent<'static>, DeemoError> {
    if event.delta > MAX_DELTA {
        return Err(DeemoError::Midi(format!(
            "Delta of {} ticks does not fit in a MIDI file",
            event.delta
        )));
    }

    let kind = match event.message {
        TrackMessage::Tempo(microseconds) => {
            if microseconds > MAX_TEMPO {
                return Err(DeemoError::Midi(format!("Tempo of {}us per beat is too slow", microseconds)));
            }
            TrackEventKind::Meta(MetaMessage::Tempo(u24::new(microseconds)))
        }
        TrackMessage::ProgramChange(program) => TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::ProgramChange {
                program: data_byte(program, "program")?,
            },
        },
        TrackMessage::Note { pitch, velocity } => TrackEventKind::Midi {
            channel: u4::new(0),
            message: MidiMessage::NoteOn {
                key: data_byte(pitch, "pitch")?,
                vel: data_byte(velocity, "velocity")?,
            },
        },
        TrackMessage::EndOfTrack => TrackEventKind::Meta(MetaMessage::EndOfTrack),
    };

    Ok(midly::TrackEvent {
        delta: u28::new(event.delta),
        kind,
    })
}

fn data_byte(value: u8, what: &str) -> Result<u7, DeemoError> {
    if value > MAX_DATA_BYTE {
        return Err(DeemoError::Midi(format!("{} {} does not fit in 7 bits", what, value)));
    }
    Ok(u7::new(value))
}
