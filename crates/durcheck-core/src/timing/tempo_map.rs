use serde::{Deserialize, Serialize};

use super::{MidiTiming, MICROSECONDS_PER_SECOND};
use crate::error::TimingError;

/// A tempo change at an absolute tick position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoChange {
    /// Absolute tick where the new tempo takes effect.
    pub tick: u64,
    /// New tempo in microseconds per beat.
    pub microseconds_per_beat: u32,
}

impl TempoChange {
    /// Tempo in beats per minute.
    pub fn bpm(&self) -> f64 {
        60.0 * MICROSECONDS_PER_SECOND / self.microseconds_per_beat as f64
    }
}

/// Piecewise-constant tempo over a file.
///
/// Tempo changes from every track apply to the whole file. The default tempo
/// is in effect until the first change; when several changes share a tick
/// the last one listed wins.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoMap {
    timing: MidiTiming,
    default_tempo_us_per_beat: u32,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    /// Builds a tempo map.
    ///
    /// # Errors
    ///
    /// Returns a [`TimingError`] if the time base or any tempo is zero.
    pub fn new(
        timing: MidiTiming,
        default_tempo_us_per_beat: u32,
        changes: impl IntoIterator<Item = TempoChange>,
    ) -> Result<Self, TimingError> {
        timing.validate()?;
        if default_tempo_us_per_beat == 0 {
            return Err(TimingError::ZeroTempo);
        }

        let mut changes: Vec<TempoChange> = changes.into_iter().collect();
        if changes.iter().any(|c| c.microseconds_per_beat == 0) {
            return Err(TimingError::ZeroTempo);
        }
        // Stable, so same-tick changes keep their file order.
        changes.sort_by_key(|c| c.tick);

        Ok(Self {
            timing,
            default_tempo_us_per_beat,
            changes,
        })
    }

    /// The header time base.
    pub fn timing(&self) -> MidiTiming {
        self.timing
    }

    /// Tempo changes sorted by tick.
    pub fn changes(&self) -> &[TempoChange] {
        &self.changes
    }

    /// Returns true if the tempo never differs from the default.
    ///
    /// For such files the single-tempo approximation is exact.
    pub fn is_constant(&self) -> bool {
        self.timing.is_timecode()
            || self
                .changes
                .iter()
                .all(|c| c.microseconds_per_beat == self.default_tempo_us_per_beat)
    }

    /// Elapsed seconds from the start of the file to `tick`.
    pub fn seconds_at(&self, tick: u64) -> f64 {
        let ticks_per_beat = match self.timing {
            MidiTiming::Metrical { ticks_per_beat } => ticks_per_beat as f64,
            MidiTiming::Timecode {
                frames_per_second,
                ticks_per_frame,
            } => return tick as f64 / (frames_per_second as f64 * ticks_per_frame as f64),
        };

        let segment = |ticks: u64, tempo: u32| {
            ticks as f64 * (tempo as f64 / MICROSECONDS_PER_SECOND) / ticks_per_beat
        };

        let mut seconds = 0.0;
        let mut last_tick = 0u64;
        let mut tempo = self.default_tempo_us_per_beat;
        for change in &self.changes {
            if change.tick >= tick {
                break;
            }
            seconds += segment(change.tick - last_tick, tempo);
            last_tick = change.tick;
            tempo = change.microseconds_per_beat;
        }
        seconds + segment(tick - last_tick, tempo)
    }
}
