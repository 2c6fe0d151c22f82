//! General audio container probes backed by `symphonia`.
//!
//! [`ContainerMode::Packets`] reads the whole stream and sums packet
//! durations, so it reflects what a decoder would actually produce.
//! [`ContainerMode::Header`] trusts the frame count the container declares,
//! which is fast but absent or wrong for some streams (e.g. MP3 without a
//! Xing header).
//!
//! Both modes open the stream in gapless mode: encoder delay and padding
//! declared in an MP3 LAME tag are trimmed, so the result is the audible
//! length rather than the raw frame count.

use durcheck_core::Measurement;
use std::fs::File;
use std::io;
use std::path::Path;
use symphonia::core::codecs::{CodecParameters, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::error::{ProbeError, ProbeResult};
use crate::probe::{detect_media_kind, extension_of, DurationProbe, MediaKind};

/// What a [`ContainerProbe`] reads to find the duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerMode {
    /// Sum the duration of every packet in the default track.
    Packets,
    /// Use the frame count declared in the container header.
    Header,
}

/// Measures wav, mp3, ogg and flac files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerProbe {
    mode: ContainerMode,
}

impl ContainerProbe {
    /// Full-read probe (method `symphonia`).
    pub fn packets() -> Self {
        Self {
            mode: ContainerMode::Packets,
        }
    }

    /// Header-only probe (method `symphonia-header`).
    pub fn header() -> Self {
        Self {
            mode: ContainerMode::Header,
        }
    }

    fn fail(&self, message: impl ToString) -> ProbeError {
        ProbeError::failed(self.name(), message.to_string())
    }

    fn open(&self, path: &Path) -> ProbeResult<Box<dyn FormatReader>> {
        let file = File::open(path).map_err(|e| ProbeError::from_io(self.name(), path, e))?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        let extension = extension_of(path);
        if !extension.is_empty() {
            hint.with_extension(&extension);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions {
                    enable_gapless: true,
                    ..Default::default()
                },
                &MetadataOptions::default(),
            )
            .map_err(|e| self.fail(e))?;
        Ok(probed.format)
    }

    fn frames_to_seconds(&self, params: &CodecParameters, frames: u64) -> ProbeResult<f64> {
        if let Some(time_base) = params.time_base {
            let time = time_base.calc_time(frames);
            return Ok(time.seconds as f64 + time.frac);
        }
        match params.sample_rate {
            Some(rate) if rate > 0 => Ok(frames as f64 / rate as f64),
            _ => Err(self.fail("stream declares neither a time base nor a sample rate")),
        }
    }

    fn count_packet_frames(&self, format: &mut dyn FormatReader, track_id: u32) -> ProbeResult<u64> {
        let mut frames: u64 = 0;
        loop {
            match format.next_packet() {
                Ok(packet) => {
                    if packet.track_id() == track_id {
                        frames += packet.dur;
                    }
                }
                Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    break
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => return Err(self.fail(e)),
            }
        }
        Ok(frames)
    }
}

impl DurationProbe for ContainerProbe {
    fn name(&self) -> &'static str {
        match self.mode {
            ContainerMode::Packets => "symphonia",
            ContainerMode::Header => "symphonia-header",
        }
    }

    fn supports(&self, path: &Path) -> bool {
        detect_media_kind(path) == Some(MediaKind::Audio)
    }

    fn probe(&self, path: &Path) -> ProbeResult<Measurement> {
        let mut format = self.open(path)?;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| self.fail("no audio track found"))?;
        let track_id = track.id;
        let params = track.codec_params.clone();

        let frames = match self.mode {
            ContainerMode::Header => params
                .n_frames
                .ok_or_else(|| self.fail("container does not declare a frame count"))?,
            ContainerMode::Packets => self.count_packet_frames(format.as_mut(), track_id)?,
        };
        debug!(path = %path.display(), method = self.name(), frames, "read audio container");

        let seconds = self.frames_to_seconds(&params, frames)?;
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
    use std::fs;

    fn write_wav(path: &Path, sample_rate: u32, frames: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let sample = (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.5;
            writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_packets_and_header_agree_on_wav() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tone.wav");
        write_wav(&path, 22050, 44100);

        let packets = ContainerProbe::packets().probe(&path).unwrap();
        let header = ContainerProbe::header().probe(&path).unwrap();
        assert_eq!(packets.method(), "symphonia");
        assert_eq!(header.method(), "symphonia-header");
        assert!((packets.seconds() - 2.0).abs() < 1e-6);
        assert!((header.seconds() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_unreadable_container_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("noise.ogg");
        fs::write(&path, vec![0u8; 64]).unwrap();

        let err = ContainerProbe::packets().probe(&path).unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Failed {
                method: "symphonia",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = ContainerProbe::header()
            .probe(Path::new("nowhere/missing.flac"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::FileNotFound(_)));
    }

    #[test]
    fn test_supports_audio_only() {
        let probe = ContainerProbe::packets();
        assert!(probe.supports(Path::new("a.mp3")));
        assert!(probe.supports(Path::new("a.flac")));
        assert!(!probe.supports(Path::new("a.mid")));
    }
}
