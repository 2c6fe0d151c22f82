//! The probe trait and media kind detection.

use durcheck_core::Measurement;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ProbeResult;

/// A black-box duration measurement backed by an external library.
pub trait DurationProbe {
    /// Method name recorded on every measurement this probe produces.
    fn name(&self) -> &'static str;

    /// Whether this probe can read the file, judged by extension only.
    fn supports(&self, path: &Path) -> bool;

    /// Measures the file's duration.
    fn probe(&self, path: &Path) -> ProbeResult<Measurement>;
}

/// Broad category of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Standard MIDI file.
    Midi,
    /// Decoded audio container.
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Midi => write!(f, "midi"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Lowercased extension without the dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Detects the media kind from the file extension.
pub fn detect_media_kind(path: &Path) -> Option<MediaKind> {
    match extension_of(path).as_str() {
        "mid" | "midi" => Some(MediaKind::Midi),
        "wav" | "mp3" | "ogg" | "flac" => Some(MediaKind::Audio),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_media_kind() {
        assert_eq!(detect_media_kind(Path::new("a.mid")), Some(MediaKind::Midi));
        assert_eq!(detect_media_kind(Path::new("a.MIDI")), Some(MediaKind::Midi));
        assert_eq!(detect_media_kind(Path::new("a.wav")), Some(MediaKind::Audio));
        assert_eq!(detect_media_kind(Path::new("a.Mp3")), Some(MediaKind::Audio));
        assert_eq!(detect_media_kind(Path::new("dir/a.ogg")), Some(MediaKind::Audio));
        assert_eq!(detect_media_kind(Path::new("a.flac")), Some(MediaKind::Audio));
        assert_eq!(detect_media_kind(Path::new("a.txt")), None);
        assert_eq!(detect_media_kind(Path::new("noext")), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("song.WAV")), "wav");
        assert_eq!(extension_of(Path::new("song")), "");
    }
}
