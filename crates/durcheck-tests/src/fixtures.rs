//! Test fixture utilities for writing synthetic media files.
//!
//! Every fixture lives in its own temporary directory, which is removed when
//! the [`MediaFixture`] is dropped.

use midly::num::{u15, u24, u28, u4, u7};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Sample rate used by [`MediaFixture::add_wav_seconds`] and
/// [`MediaFixture::add_mp3_silence`].
pub const FIXTURE_SAMPLE_RATE: u32 = 44_100;

/// Samples per MPEG-1 Layer III frame.
pub const MP3_FRAME_SAMPLES: u32 = 1152;

/// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, no CRC, no padding, mono.
const MP3_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC0];
/// `144 * 128000 / 44100`, rounded down, header included.
const MP3_FRAME_LEN: usize = 417;
/// Mono MPEG-1 side information length.
const MP3_SIDE_INFO_LEN: usize = 17;

/// A temporary directory of generated WAV and MIDI files.
pub struct MediaFixture {
    pub root: TempDir,
}

impl Default for MediaFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaFixture {
    /// Create a new empty fixture directory.
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Path of `name` inside the fixture, whether or not it exists.
    pub fn join(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    /// Write raw bytes to a file.
    pub fn add_file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.join(name);
        fs::write(&path, content).expect("Failed to write fixture file");
        path
    }

    /// Write a mono 16-bit WAV with `frames` frames.
    pub fn add_wav(&self, name: &str, sample_rate: u32, frames: u32) -> PathBuf {
        let path = self.join(name);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("Failed to create WAV");
        for i in 0..frames {
            // Quiet triangle wave; content does not matter, only length.
            let sample = ((i % 200) as i16 - 100) * 40;
            writer.write_sample(sample).expect("Failed to write sample");
        }
        writer.finalize().expect("Failed to finalize WAV");
        path
    }

    /// Write a WAV lasting `seconds` at [`FIXTURE_SAMPLE_RATE`].
    pub fn add_wav_seconds(&self, name: &str, seconds: f64) -> PathBuf {
        let frames = (seconds * FIXTURE_SAMPLE_RATE as f64).round() as u32;
        self.add_wav(name, FIXTURE_SAMPLE_RATE, frames)
    }

    /// Write a silent MP3 of `frames` audio frames behind a LAME `Info` tag.
    ///
    /// The tag declares `delay` and `padding` encoder samples, so the audible
    /// length is `frames * 1152 - delay - padding` samples at
    /// [`FIXTURE_SAMPLE_RATE`]. Both values must fit in 12 bits.
    pub fn add_mp3_silence(&self, name: &str, frames: u32, delay: u16, padding: u16) -> PathBuf {
        assert!(delay < 4096 && padding < 4096, "LAME delay/padding are 12-bit");

        let mut bytes = Vec::with_capacity(MP3_FRAME_LEN * (frames as usize + 1));
        bytes.extend_from_slice(&lame_info_frame(frames, delay, padding));
        for _ in 0..frames {
            let mut frame = vec![0u8; MP3_FRAME_LEN];
            frame[..4].copy_from_slice(&MP3_FRAME_HEADER);
            bytes.extend_from_slice(&frame);
        }
        self.add_file(name, &bytes)
    }

    /// Write a single-track MIDI file of `total_ticks` with no tempo events.
    pub fn add_midi(&self, name: &str, ticks_per_beat: u16, total_ticks: u32) -> PathBuf {
        let smf = Smf {
            header: Header::new(
                Format::SingleTrack,
                Timing::Metrical(u15::new(ticks_per_beat)),
            ),
            tracks: vec![note_track(total_ticks)],
        };
        self.save_midi(name, &smf)
    }

    /// Write a two-track MIDI file: a conductor track carrying `tempos` as
    /// `(absolute tick, microseconds per beat)` and a note track spanning
    /// `total_ticks`.
    pub fn add_midi_with_tempos(
        &self,
        name: &str,
        ticks_per_beat: u16,
        tempos: &[(u32, u32)],
        total_ticks: u32,
    ) -> PathBuf {
        let mut sorted = tempos.to_vec();
        sorted.sort_by_key(|&(tick, _)| tick);

        let mut conductor = Vec::with_capacity(sorted.len() + 1);
        let mut previous = 0;
        for (tick, tempo) in sorted {
            conductor.push(TrackEvent {
                delta: u28::new(tick - previous),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo))),
            });
            previous = tick;
        }
        conductor.push(end_of_track(0));

        let smf = Smf {
            header: Header::new(Format::Parallel, Timing::Metrical(u15::new(ticks_per_beat))),
            tracks: vec![conductor, note_track(total_ticks)],
        };
        self.save_midi(name, &smf)
    }

    /// Write a format 2 (sequential) MIDI file with one track per length.
    pub fn add_sequential_midi(
        &self,
        name: &str,
        ticks_per_beat: u16,
        track_ticks: &[u32],
    ) -> PathBuf {
        let smf = Smf {
            header: Header::new(
                Format::Sequential,
                Timing::Metrical(u15::new(ticks_per_beat)),
            ),
            tracks: track_ticks.iter().map(|&ticks| note_track(ticks)).collect(),
        };
        self.save_midi(name, &smf)
    }

    fn save_midi(&self, name: &str, smf: &Smf<'_>) -> PathBuf {
        let path = self.join(name);
        smf.save(&path).expect("Failed to write MIDI");
        path
    }
}

/// Builds the leading frame carrying the Xing `Info` tag and LAME extension.
fn lame_info_frame(frames: u32, delay: u16, padding: u16) -> Vec<u8> {
    let mut frame = vec![0u8; MP3_FRAME_LEN];
    frame[..4].copy_from_slice(&MP3_FRAME_HEADER);

    let mut tag = Vec::new();
    tag.extend_from_slice(b"Info");
    // Only the frame count field is present.
    tag.extend_from_slice(&1u32.to_be_bytes());
    tag.extend_from_slice(&frames.to_be_bytes());

    tag.extend_from_slice(b"LAME3.100");
    tag.push(0); // revision / VBR method
    tag.push(0); // lowpass
    tag.extend_from_slice(&0u32.to_be_bytes()); // peak signal
    tag.extend_from_slice(&0u16.to_be_bytes()); // radio replay gain
    tag.extend_from_slice(&0u16.to_be_bytes()); // audiophile replay gain
    tag.push(0); // encoding flags
    tag.push(0); // bitrate
    let trim = (u32::from(delay) << 12) | u32::from(padding);
    tag.extend_from_slice(&trim.to_be_bytes()[1..]);
    tag.push(0); // misc
    tag.push(0); // mp3 gain
    tag.extend_from_slice(&0u16.to_be_bytes()); // preset
    let music_length = (MP3_FRAME_LEN as u32) * (frames + 1);
    tag.extend_from_slice(&music_length.to_be_bytes());
    tag.extend_from_slice(&0u16.to_be_bytes()); // music crc

    let start = 4 + MP3_SIDE_INFO_LEN;
    frame[start..start + tag.len()].copy_from_slice(&tag);
    let crc_at = start + tag.len();
    let crc = crc16_arc(&frame[..crc_at]);
    frame[crc_at..crc_at + 2].copy_from_slice(&crc.to_be_bytes());
    frame
}

/// CRC-16/ARC, the checksum LAME stores over its tag.
fn crc16_arc(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xA001
            } else {
                crc >> 1
            };
        }
    }
    crc
}

fn note_track(total_ticks: u32) -> Vec<TrackEvent<'static>> {
    vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(60),
                    vel: u7::new(100),
                },
            },
        },
        TrackEvent {
            delta: u28::new(total_ticks),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(60),
                    vel: u7::new(0),
                },
            },
        },
        end_of_track(0),
    ]
}

fn end_of_track(delta: u32) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(delta),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_files_exist() {
        let fixture = MediaFixture::new();
        let wav = fixture.add_wav_seconds("a.wav", 0.5);
        let midi = fixture.add_midi("a.mid", 480, 960);
        assert!(wav.exists());
        assert!(midi.exists());
        assert!(!fixture.join("missing.wav").exists());
    }

    #[test]
    fn test_crc16_arc_check_value() {
        assert_eq!(crc16_arc(b"123456789"), 0xBB3D);
    }

    #[test]
    fn test_mp3_fixture_layout() {
        let fixture = MediaFixture::new();
        let mp3 = fixture.add_mp3_silence("a.mp3", 10, 576, 1000);
        let bytes = fs::read(mp3).unwrap();
        assert_eq!(bytes.len(), MP3_FRAME_LEN * 11);
        assert_eq!(&bytes[..4], &MP3_FRAME_HEADER);
        assert_eq!(&bytes[21..25], b"Info");
        assert_eq!(&bytes[33..42], b"LAME3.100");
        // 576 << 12 | 1000
        assert_eq!(&bytes[54..57], &[0x24, 0x03, 0xE8]);
        assert_eq!(&bytes[MP3_FRAME_LEN..MP3_FRAME_LEN + 4], &MP3_FRAME_HEADER);
    }

    #[test]
    fn test_wav_fixture_frame_count() {
        let fixture = MediaFixture::new();
        let wav = fixture.add_wav_seconds("a.wav", 0.25);
        let reader = hound::WavReader::open(wav).unwrap();
        assert_eq!(reader.duration(), 11_025);
    }
}
