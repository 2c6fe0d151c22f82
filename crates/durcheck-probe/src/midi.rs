//! MIDI duration probes backed by `midly`.
//!
//! Two measurements are available. The tempo-map probe integrates every
//! tempo change and matches what a player hears. The fixed-tempo probe
//! multiplies the longest track's tick count by one assumed tempo; it is a
//! known approximation and diverges for files whose tempo changes.

use durcheck_core::{
    ticks_to_seconds, Measurement, MidiTiming, TempoChange, TempoMap, TimingError,
    DEFAULT_TEMPO_US_PER_BEAT,
};
use midly::{Format, MetaMessage, Smf, Timing, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ProbeError, ProbeResult};
use crate::probe::{detect_media_kind, DurationProbe, MediaKind};

const TEMPO_MAP_METHOD: &str = "midly";
const FIXED_TEMPO_METHOD: &str = "midly-fixed-tempo";

/// How MIDI ticks are turned into seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidiTimingMode {
    /// Integrate over every tempo change in the file.
    #[default]
    TempoMap,
    /// Assume one constant tempo for the whole file.
    FixedTempo,
}

/// Timing facts extracted from a parsed MIDI file.
#[derive(Debug, Clone, PartialEq)]
pub struct MidiSummary {
    /// SMF format: 0 (single track), 1 (parallel), or 2 (sequential).
    pub format: u8,
    /// Header time base.
    pub timing: MidiTiming,
    /// Sum of event deltas for each track.
    pub track_ticks: Vec<u64>,
    /// Tempo events from every track, keyed by absolute tick.
    pub tempo_changes: Vec<TempoChange>,
}

impl MidiSummary {
    /// Length of the longest track in ticks.
    pub fn total_ticks(&self) -> u64 {
        self.track_ticks.iter().copied().max().unwrap_or(0)
    }

    /// Builds the file's tempo map.
    pub fn tempo_map(&self, default_tempo_us_per_beat: u32) -> Result<TempoMap, TimingError> {
        TempoMap::new(
            self.timing,
            default_tempo_us_per_beat,
            self.tempo_changes.iter().copied(),
        )
    }

    /// Duration with every tempo change applied.
    ///
    /// Sequential (type 2) files hold independent songs per track and have
    /// no single length.
    pub fn tempo_map_seconds(&self, default_tempo_us_per_beat: u32) -> ProbeResult<f64> {
        if self.format == 2 {
            return Err(ProbeError::failed(
                TEMPO_MAP_METHOD,
                "cannot compute length of a sequential (type 2) file",
            ));
        }
        let map = self
            .tempo_map(default_tempo_us_per_beat)
            .map_err(|e| ProbeError::failed(TEMPO_MAP_METHOD, e.to_string()))?;
        Ok(map.seconds_at(self.total_ticks()))
    }

    /// Duration assuming `tempo_us_per_beat` throughout.
    pub fn fixed_tempo_seconds(&self, tempo_us_per_beat: u32) -> ProbeResult<f64> {
        let seconds = match self.timing {
            MidiTiming::Metrical { ticks_per_beat } => {
                ticks_to_seconds(self.total_ticks(), ticks_per_beat, tempo_us_per_beat)
            }
            timecode => timecode
                .seconds_per_tick(tempo_us_per_beat)
                .map(|per_tick| per_tick * self.total_ticks() as f64),
        };
        seconds.map_err(|e| ProbeError::failed(FIXED_TEMPO_METHOD, e.to_string()))
    }
}

/// Parses MIDI bytes and extracts the timing summary.
pub fn analyze_midi(bytes: &[u8]) -> ProbeResult<MidiSummary> {
    let smf = Smf::parse(bytes).map_err(|e| ProbeError::failed(TEMPO_MAP_METHOD, e.to_string()))?;

    let format = match smf.header.format {
        Format::SingleTrack => 0,
        Format::Parallel => 1,
        Format::Sequential => 2,
    };

    let timing = match smf.header.timing {
        Timing::Metrical(ticks) => MidiTiming::Metrical {
            ticks_per_beat: ticks.as_int(),
        },
        Timing::Timecode(fps, ticks_per_frame) => MidiTiming::Timecode {
            frames_per_second: fps.as_f32(),
            ticks_per_frame,
        },
    };

    let mut track_ticks = Vec::with_capacity(smf.tracks.len());
    let mut tempo_changes = Vec::new();
    for track in &smf.tracks {
        let mut tick: u64 = 0;
        for event in track {
            tick += event.delta.as_int() as u64;
            if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = event.kind {
                tempo_changes.push(TempoChange {
                    tick,
                    microseconds_per_beat: tempo.as_int(),
                });
            }
        }
        track_ticks.push(tick);
    }

    Ok(MidiSummary {
        format,
        timing,
        track_ticks,
        tempo_changes,
    })
}

/// Measures `.mid` / `.midi` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiProbe {
    mode: MidiTimingMode,
    default_tempo_us_per_beat: u32,
}

impl MidiProbe {
    /// Tempo-map-aware probe (method `midly`).
    pub fn tempo_map() -> Self {
        Self {
            mode: MidiTimingMode::TempoMap,
            default_tempo_us_per_beat: DEFAULT_TEMPO_US_PER_BEAT,
        }
    }

    /// Single-tempo approximation (method `midly-fixed-tempo`).
    pub fn fixed_tempo(tempo_us_per_beat: u32) -> Self {
        Self {
            mode: MidiTimingMode::FixedTempo,
            default_tempo_us_per_beat: tempo_us_per_beat,
        }
    }

    /// Probe for a timing mode with an explicit default tempo.
    pub fn with_mode(mode: MidiTimingMode, default_tempo_us_per_beat: u32) -> Self {
        Self {
            mode,
            default_tempo_us_per_beat,
        }
    }

    /// The timing mode.
    pub fn mode(&self) -> MidiTimingMode {
        self.mode
    }

    /// Computes the duration from an already parsed summary.
    pub fn seconds(&self, summary: &MidiSummary) -> ProbeResult<f64> {
        match self.mode {
            MidiTimingMode::TempoMap => summary.tempo_map_seconds(self.default_tempo_us_per_beat),
            MidiTimingMode::FixedTempo => {
                let constant = summary
                    .tempo_map(self.default_tempo_us_per_beat)
                    .map(|map| map.is_constant())
                    .unwrap_or(true);
                if !constant {
                    warn!(
                        tempo_changes = summary.tempo_changes.len(),
                        "file changes tempo; fixed-tempo duration is an approximation"
                    );
                }
                summary.fixed_tempo_seconds(self.default_tempo_us_per_beat)
            }
        }
    }
}

impl DurationProbe for MidiProbe {
    fn name(&self) -> &'static str {
        match self.mode {
            MidiTimingMode::TempoMap => TEMPO_MAP_METHOD,
            MidiTimingMode::FixedTempo => FIXED_TEMPO_METHOD,
        }
    }

    fn supports(&self, path: &Path) -> bool {
        detect_media_kind(path) == Some(MediaKind::Midi)
    }

    fn probe(&self, path: &Path) -> ProbeResult<Measurement> {
        let bytes = fs::read(path).map_err(|e| ProbeError::from_io(self.name(), path, e))?;
        let summary = analyze_midi(&bytes)?;
        debug!(
            path = %path.display(),
            format = summary.format,
            tracks = summary.track_ticks.len(),
            total_ticks = summary.total_ticks(),
            "parsed midi file"
        );
        let seconds = self.seconds(&summary)?;
        Ok(Measurement::new(
            path.display().to_string(),
            seconds,
            self.name(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u15, u24, u28};
    use midly::{Header, TrackEvent};

    fn tempo(delta: u32, us: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(us))),
        }
    }

    fn end(delta: u32) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        }
    }

    fn write_midi(
        dir: &Path,
        name: &str,
        format: Format,
        tracks: Vec<Vec<TrackEvent<'static>>>,
    ) -> std::path::PathBuf {
        let path = dir.join(name);
        let smf = Smf {
            header: Header::new(format, Timing::Metrical(u15::new(480))),
            tracks,
        };
        smf.save(&path).unwrap();
        path
    }

    #[test]
    fn test_longest_track_sets_total_ticks() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_midi(
            tmp.path(),
            "two_tracks.mid",
            Format::Parallel,
            vec![vec![end(960)], vec![end(1440)]],
        );
        let summary = analyze_midi(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(summary.format, 1);
        assert_eq!(summary.track_ticks, vec![960, 1440]);
        assert_eq!(summary.total_ticks(), 1440);
        assert_eq!(
            summary.timing,
            MidiTiming::Metrical {
                ticks_per_beat: 480
            }
        );
    }

    #[test]
    fn test_default_tempo_both_modes_agree() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_midi(
            tmp.path(),
            "plain.mid",
            Format::SingleTrack,
            vec![vec![end(1920)]],
        );
        let exact = MidiProbe::tempo_map().probe(&path).unwrap();
        let approx = MidiProbe::fixed_tempo(DEFAULT_TEMPO_US_PER_BEAT)
            .probe(&path)
            .unwrap();
        assert_eq!(exact.method(), "midly");
        assert_eq!(approx.method(), "midly-fixed-tempo");
        assert!((exact.seconds() - 2.0).abs() < 1e-9);
        assert!((approx.seconds() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_tempo_change_diverges_from_fixed_tempo() {
        let tmp = tempfile::tempdir().unwrap();
        // 480 ticks at 120 BPM, then 480 ticks at 60 BPM.
        let path = write_midi(
            tmp.path(),
            "tempo_change.mid",
            Format::Parallel,
            vec![
                vec![tempo(0, 500_000), tempo(480, 1_000_000), end(0)],
                vec![end(960)],
            ],
        );
        let exact = MidiProbe::tempo_map().probe(&path).unwrap();
        let approx = MidiProbe::fixed_tempo(DEFAULT_TEMPO_US_PER_BEAT)
            .probe(&path)
            .unwrap();
        assert!((exact.seconds() - 1.5).abs() < 1e-9);
        assert!((approx.seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_sequential_file_fails_tempo_map() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_midi(
            tmp.path(),
            "sequential.mid",
            Format::Sequential,
            vec![vec![end(480)], vec![end(480)]],
        );
        let err = MidiProbe::tempo_map().probe(&path).unwrap_err();
        assert!(err.to_string().contains("sequential"));

        let approx = MidiProbe::fixed_tempo(DEFAULT_TEMPO_US_PER_BEAT)
            .probe(&path)
            .unwrap();
        assert!((approx.seconds() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_garbage_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("garbage.mid");
        fs::write(&path, b"definitely not a midi file").unwrap();
        let err = MidiProbe::tempo_map().probe(&path).unwrap_err();
        assert_eq!(err.code(), "PROBE_003");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = MidiProbe::tempo_map()
            .probe(Path::new("does/not/exist.mid"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::FileNotFound(_)));
    }

    #[test]
    fn test_supports_only_midi() {
        let probe = MidiProbe::tempo_map();
        assert!(probe.supports(Path::new("a.mid")));
        assert!(probe.supports(Path::new("a.midi")));
        assert!(!probe.supports(Path::new("a.wav")));
    }

    #[test]
    fn test_timing_mode_serde() {
        assert_eq!(
            serde_json::to_string(&MidiTimingMode::FixedTempo).unwrap(),
            r#""fixed_tempo""#
        );
        assert_eq!(MidiTimingMode::default(), MidiTimingMode::TempoMap);
    }
}
