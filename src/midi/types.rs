//! MIDI encoding type definitions

/// Ticks per quarter note.
pub const TICKS_PER_BEAT: u16 = 480;

/// 120 beats per minute.
pub const MICROSECONDS_PER_BEAT: u32 = 500_000;

/// Acoustic grand piano.
pub const DEFAULT_PROGRAM: u8 = 0;

/// Ticks between the last note event and the end-of-track marker.
pub const END_OF_TRACK_DELTA: u32 = 1;

/// Fixed parameters of the encoded track.
///
/// [`Default`] is the only configuration the converter writes; the fields exist so
/// the tick conversion can be checked in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub ticks_per_beat: u16,
    pub microseconds_per_beat: u32,
    pub program: u8,
    pub end_of_track_delta: u32,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ticks_per_beat: TICKS_PER_BEAT,
            microseconds_per_beat: MICROSECONDS_PER_BEAT,
            program: DEFAULT_PROGRAM,
            end_of_track_delta: END_OF_TRACK_DELTA,
        }
    }
}

impl EncoderConfig {
    /// Ticks per second under this tempo and resolution (960 by default).
    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_beat as f64 * 1_000_000.0 / self.microseconds_per_beat as f64
    }
}

/// What a track event does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackMessage {
    /// Set tempo, in microseconds per beat
    Tempo(u32),
    ProgramChange(u8),
    /// Note-on; velocity 0 is a note-off
    Note { pitch: u8, velocity: u8 },
    EndOfTrack,
}

/// A track event with its time stored as ticks since the previous event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackEvent {
    pub delta: u32,
    pub message: TrackMessage,
}

impl TrackEvent {
    pub fn new(delta: u32, message: TrackMessage) -> Self {
        Self { delta, message }
    }
}

/// A note event before delta conversion. Field order is the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct AbsoluteEvent {
    pub tick: u32,
    pub pitch: u8,
    pub velocity: u8,
}
