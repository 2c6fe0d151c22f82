//! MIDI length command implementation
//!
//! Reports both MIDI durations for one file: the tempo-map value and the
//! single-tempo approximation, plus how far apart they are.

use anyhow::Result;
use colored::Colorize;
use durcheck_core::{format_timestamp, MidiTiming, TempoChange, DEFAULT_TEMPO_US_PER_BEAT};
use durcheck_probe::{analyze_midi, MidiSummary, ProbeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{error_codes, JsonError};

/// Divergence below this is rounding noise, not a tempo effect.
const DIVERGENCE_EPSILON_SECONDS: f64 = 1e-6;

/// JSON output for the midi-length command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiLengthOutput {
    pub success: bool,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<MidiLengthDetails>,
    pub errors: Vec<JsonError>,
}

/// Timing facts and both duration estimates for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiLengthDetails {
    pub format: u8,
    pub timing: MidiTiming,
    pub track_ticks: Vec<u64>,
    pub total_ticks: u64,
    pub tempo_changes: Vec<TempoChange>,
    /// Duration with every tempo change applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_map_seconds: Option<f64>,
    /// Why the tempo-map duration is unavailable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo_map_error: Option<String>,
    /// Tempo assumed by the approximation
    pub fixed_tempo_us_per_beat: u32,
    /// Duration assuming one tempo throughout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_tempo_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_tempo_error: Option<String>,
    /// `fixed_tempo_seconds - tempo_map_seconds`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence_seconds: Option<f64>,
}

impl MidiLengthDetails {
    pub fn from_summary(summary: &MidiSummary, fixed_tempo_us_per_beat: u32) -> Self {
        let tempo_map = summary.tempo_map_seconds(DEFAULT_TEMPO_US_PER_BEAT);
        let fixed = summary.fixed_tempo_seconds(fixed_tempo_us_per_beat);
        let divergence = match (&tempo_map, &fixed) {
            (Ok(exact), Ok(approx)) => Some(approx - exact),
            _ => None,
        };

        Self {
            format: summary.format,
            timing: summary.timing,
            track_ticks: summary.track_ticks.clone(),
            total_ticks: summary.total_ticks(),
            tempo_changes: summary.tempo_changes.clone(),
            tempo_map_seconds: tempo_map.as_ref().ok().copied(),
            tempo_map_error: tempo_map.err().map(|e| e.to_string()),
            fixed_tempo_us_per_beat,
            fixed_tempo_seconds: fixed.as_ref().ok().copied(),
            fixed_tempo_error: fixed.err().map(|e| e.to_string()),
            divergence_seconds: divergence,
        }
    }
}

/// Run the midi-length command.
///
/// # Arguments
/// * `file` - MIDI file to measure
/// * `tempo_us_per_beat` - Tempo assumed by the fixed-tempo estimate
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if the file was parsed, 1 otherwise
pub fn run(file: &str, tempo_us_per_beat: u32, json_output: bool) -> Result<ExitCode> {
    let details = match load(Path::new(file), tempo_us_per_beat) {
        Ok(details) => details,
        Err(e) => {
            if json_output {
                let code = match e {
                    ProbeError::FileNotFound(_) => error_codes::FILE_READ,
                    _ => error_codes::MIDI_PARSE,
                };
                let output = MidiLengthOutput {
                    success: false,
                    file: file.to_string(),
                    details: None,
                    errors: vec![JsonError::new(code, e.to_string()).with_file(file)],
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(ExitCode::from(1));
            }
            anyhow::bail!("Failed to read MIDI file {}: {}", file, e);
        }
    };

    if json_output {
        let output = MidiLengthOutput {
            success: true,
            file: file.to_string(),
            details: Some(details),
            errors: vec![],
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render(file, &details));
    }
    Ok(ExitCode::SUCCESS)
}

fn load(path: &Path, tempo_us_per_beat: u32) -> Result<MidiLengthDetails, ProbeError> {
    let bytes = fs::read(path).map_err(|e| ProbeError::from_io("midly", path, e))?;
    let summary = analyze_midi(&bytes)?;
    Ok(MidiLengthDetails::from_summary(&summary, tempo_us_per_beat))
}

fn describe_timing(timing: &MidiTiming) -> String {
    match timing {
        MidiTiming::Metrical { ticks_per_beat } => format!("{} ticks per beat", ticks_per_beat),
        MidiTiming::Timecode {
            frames_per_second,
            ticks_per_frame,
        } => format!(
            "SMPTE {} fps, {} ticks per frame",
            frames_per_second, ticks_per_frame
        ),
    }
}

fn describe_seconds(seconds: f64) -> String {
    format!("{} ({:.3} s)", format_timestamp(seconds), seconds)
}

/// Renders the human-readable report.
pub fn render(file: &str, details: &MidiLengthDetails) -> String {
    let mut lines = vec![
        format!("File: {}", file),
        format!(
            "Format: {} ({} tracks), timing: {}",
            details.format,
            details.track_ticks.len(),
            describe_timing(&details.timing)
        ),
        format!("Total ticks: {} (longest track)", details.total_ticks),
        format!("Tempo changes: {}", details.tempo_changes.len()),
    ];

    for change in &details.tempo_changes {
        lines.push(format!(
            "  tick {:>8}: {} us/beat ({:.2} BPM)",
            change.tick,
            change.microseconds_per_beat,
            change.bpm()
        ));
    }

    match (&details.tempo_map_seconds, &details.tempo_map_error) {
        (Some(seconds), _) => lines.push(format!(
            "Tempo-map length:   {}  [midly]",
            describe_seconds(*seconds)
        )),
        (None, error) => lines.push(format!(
            "Tempo-map length:   {} {}",
            "unavailable:".yellow(),
            error.as_deref().unwrap_or("unknown error")
        )),
    }

    let bpm = 60_000_000.0 / details.fixed_tempo_us_per_beat as f64;
    match (&details.fixed_tempo_seconds, &details.fixed_tempo_error) {
        (Some(seconds), _) => lines.push(format!(
            "Fixed-tempo length: {}  [midly-fixed-tempo @ {:.2} BPM]",
            describe_seconds(*seconds),
            bpm
        )),
        (None, error) => lines.push(format!(
            "Fixed-tempo length: {} {}",
            "unavailable:".yellow(),
            error.as_deref().unwrap_or("unknown error")
        )),
    }

    if let Some(divergence) = details.divergence_seconds {
        lines.push(format!("Divergence: {:+.6} s", divergence));
        if divergence.abs() > DIVERGENCE_EPSILON_SECONDS {
            lines.push(
                "Note: the fixed-tempo length is an approximation and differs from the tempo map"
                    .yellow()
                    .to_string(),
            );
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use durcheck_tests::MediaFixture;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_constant_tempo_has_no_divergence() {
        let fixture = MediaFixture::new();
        let midi = fixture.add_midi("plain.mid", 480, 1920);

        let details = load(&midi, DEFAULT_TEMPO_US_PER_BEAT).unwrap();
        assert_eq!(details.format, 0);
        assert_eq!(details.total_ticks, 1920);
        assert!((details.tempo_map_seconds.unwrap() - 2.0).abs() < 1e-9);
        assert!((details.fixed_tempo_seconds.unwrap() - 2.0).abs() < 1e-9);
        assert!(details.divergence_seconds.unwrap().abs() < DIVERGENCE_EPSILON_SECONDS);
    }

    #[test]
    fn test_tempo_change_reports_divergence() {
        colored::control::set_override(false);
        let fixture = MediaFixture::new();
        let midi =
            fixture.add_midi_with_tempos("changes.mid", 480, &[(0, 500_000), (480, 1_000_000)], 960);

        let details = load(&midi, DEFAULT_TEMPO_US_PER_BEAT).unwrap();
        assert_eq!(details.tempo_changes.len(), 2);
        assert!((details.tempo_map_seconds.unwrap() - 1.5).abs() < 1e-9);
        assert!((details.fixed_tempo_seconds.unwrap() - 1.0).abs() < 1e-9);
        assert!((details.divergence_seconds.unwrap() + 0.5).abs() < 1e-9);

        let text = render("changes.mid", &details);
        assert!(text.contains("Tempo-map length:   00:01.500"));
        assert!(text.contains("Fixed-tempo length: 00:01.000"));
        assert!(text.contains("@ 120.00 BPM"));
        assert!(text.contains("Divergence: -0.500000 s"));
        assert!(text.contains("approximation"));
    }

    #[test]
    fn test_custom_fixed_tempo() {
        let fixture = MediaFixture::new();
        let midi = fixture.add_midi("plain.mid", 480, 1920);

        // 60 BPM doubles the approximate length.
        let details = load(&midi, 1_000_000).unwrap();
        assert!((details.fixed_tempo_seconds.unwrap() - 4.0).abs() < 1e-9);
        assert!((details.divergence_seconds.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_sequential_file_has_no_tempo_map_length() {
        colored::control::set_override(false);
        let fixture = MediaFixture::new();
        let midi = fixture.add_sequential_midi("songs.mid", 480, &[960, 480]);

        let details = load(&midi, DEFAULT_TEMPO_US_PER_BEAT).unwrap();
        assert_eq!(details.format, 2);
        assert!(details.tempo_map_seconds.is_none());
        assert!(details.tempo_map_error.unwrap().contains("type 2"));
        assert!((details.fixed_tempo_seconds.unwrap() - 1.0).abs() < 1e-9);
        assert!(details.divergence_seconds.is_none());
    }

    #[test]
    fn test_missing_file_fails() {
        let err = load(Path::new("/nonexistent/song.mid"), DEFAULT_TEMPO_US_PER_BEAT).unwrap_err();
        assert!(matches!(err, ProbeError::FileNotFound(_)));

        let code = run("/nonexistent/song.mid", DEFAULT_TEMPO_US_PER_BEAT, true).unwrap();
        assert_eq!(code, ExitCode::from(1));
        assert!(run("/nonexistent/song.mid", DEFAULT_TEMPO_US_PER_BEAT, false).is_err());
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let fixture = MediaFixture::new();
        let bad = fixture.add_file("bad.mid", b"not a midi file");
        let err = load(&bad, DEFAULT_TEMPO_US_PER_BEAT).unwrap_err();
        assert!(matches!(err, ProbeError::Failed { .. }));
    }
}
