//! WAV header probe backed by `hound`.

use durcheck_core::Measurement;
use std::path::Path;

use crate::error::{ProbeError, ProbeResult};
use crate::probe::{extension_of, DurationProbe};

const METHOD: &str = "hound";

/// Reads the frame count and sample rate from a WAV header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WavProbe;

impl WavProbe {
    /// Creates the probe.
    pub fn new() -> Self {
        Self
    }
}

impl DurationProbe for WavProbe {
    fn name(&self) -> &'static str {
        METHOD
    }

    fn supports(&self, path: &Path) -> bool {
        extension_of(path) == "wav"
    }

    fn probe(&self, path: &Path) -> ProbeResult<Measurement> {
        let reader = hound::WavReader::open(path).map_err(|e| match e {
            hound::Error::IoError(io) => ProbeError::from_io(METHOD, path, io),
            other => ProbeError::failed(METHOD, other.to_string()),
        })?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(ProbeError::failed(METHOD, "sample rate is zero"));
        }
        // Frames, i.e. samples per channel.
        let frames = reader.duration();
        let seconds = frames as f64 / spec.sample_rate as f64;
        Ok(Measurement::new(path.display().to_string(), seconds, METHOD))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames * channels as u32 {
            writer.write_sample((i % 128) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_mono_duration() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mono.wav");
        write_wav(&path, 1, 8000, 12000);

        let m = WavProbe.probe(&path).unwrap();
        assert_eq!(m.method(), "hound");
        assert!((m.seconds() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_stereo_counts_frames_not_samples() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stereo.wav");
        write_wav(&path, 2, 44100, 44100);

        let m = WavProbe.probe(&path).unwrap();
        assert!((m.seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_not_a_wav() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fake.wav");
        fs::write(&path, b"not riff data at all").unwrap();

        let err = WavProbe.probe(&path).unwrap_err();
        assert!(matches!(err, ProbeError::Failed { method: "hound", .. }));
    }

    #[test]
    fn test_supports() {
        assert!(WavProbe.supports(Path::new("a.WAV")));
        assert!(!WavProbe.supports(Path::new("a.mp3")));
    }
}
