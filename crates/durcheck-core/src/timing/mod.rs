//! MIDI tick-to-seconds conversion.
//!
//! [`ticks_to_seconds`] is the single-tempo approximation: it assumes one
//! constant tempo for the whole file and ignores tempo-change events.
//! [`TempoMap`] integrates over tempo changes and is what a full MIDI player
//! would use. The two diverge for any file whose tempo changes mid-way.

mod tempo_map;


use serde::{Deserialize, Serialize};

use crate::error::TimingError;

pub use tempo_map::{TempoChange, TempoMap};

/// Tempo assumed when a file carries no tempo event: 120 BPM.
pub const DEFAULT_TEMPO_US_PER_BEAT: u32 = 500_000;

const MICROSECONDS_PER_SECOND: f64 = 1_000_000.0;

/// Converts a tick count to seconds at a single constant tempo.
///
/// `seconds_per_tick = (tempo / 1_000_000) / ticks_per_beat`
///
/// # Errors
///
/// [`TimingError::ZeroTicksPerBeat`] or [`TimingError::ZeroTempo`] if either
/// divisor is zero.
pub fn ticks_to_seconds(
    total_ticks: u64,
    ticks_per_beat: u16,
    tempo_us_per_beat: u32,
) -> Result<f64, TimingError> {
    if ticks_per_beat == 0 {
        return Err(TimingError::ZeroTicksPerBeat);
    }
    if tempo_us_per_beat == 0 {
        return Err(TimingError::ZeroTempo);
    }
    let seconds_per_tick =
        (tempo_us_per_beat as f64 / MICROSECONDS_PER_SECOND) / ticks_per_beat as f64;
    Ok(total_ticks as f64 * seconds_per_tick)
}

/// Time base declared in a MIDI file header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MidiTiming {
    /// Ticks per quarter-note beat; real time depends on tempo.
    Metrical {
        /// Ticks in one beat.
        ticks_per_beat: u16,
    },
    /// SMPTE timecode; real time is independent of tempo.
    Timecode {
        /// Frames per second (29.97 for drop-frame).
        frames_per_second: f32,
        /// Ticks in one frame.
        ticks_per_frame: u8,
    },
}

impl MidiTiming {
    /// Checks that the time base can be divided by.
    pub fn validate(&self) -> Result<(), TimingError> {
        match *self {
            MidiTiming::Metrical { ticks_per_beat } if ticks_per_beat == 0 => {
                Err(TimingError::ZeroTicksPerBeat)
            }
            MidiTiming::Timecode {
                frames_per_second,
                ticks_per_frame,
            } if !(frames_per_second > 0.0) || ticks_per_frame == 0 => {
                Err(TimingError::ZeroFrameRate)
            }
            _ => Ok(()),
        }
    }

    /// Seconds per tick assuming `tempo_us_per_beat` for the whole file.
    ///
    /// Timecode timing ignores the tempo.
    pub fn seconds_per_tick(&self, tempo_us_per_beat: u32) -> Result<f64, TimingError> {
        self.validate()?;
        match *self {
            MidiTiming::Metrical { ticks_per_beat } => {
                ticks_to_seconds(1, ticks_per_beat, tempo_us_per_beat)
            }
            MidiTiming::Timecode {
                frames_per_second,
                ticks_per_frame,
            } => Ok(1.0 / (frames_per_second as f64 * ticks_per_frame as f64)),
        }
    }

    /// Returns true for SMPTE timecode timing.
    pub fn is_timecode(&self) -> bool {
        matches!(self, MidiTiming::Timecode { .. })
    }
}
