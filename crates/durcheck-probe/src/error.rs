//! Error types for probes.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for probe operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while measuring a file.
///
/// None of these abort a batch: callers collect them per file.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The path does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// No probe can read files with this extension.
    #[error("{}", unavailable_message(.extension))]
    Unavailable {
        /// Lowercased extension without the dot (empty if none).
        extension: String,
    },

    /// A probe could not decode or parse the file.
    #[error("{method}: {message}")]
    Failed {
        /// Method name of the failing probe.
        method: &'static str,
        /// Error reported by the underlying library.
        message: String,
    },

    /// Every probe that supports the file failed.
    #[error("{}", join_failures(.0))]
    Exhausted(Vec<ProbeError>),
}

fn unavailable_message(extension: &str) -> String {
    if extension.is_empty() {
        "no suitable probe for files without an extension".to_string()
    } else {
        format!("no suitable probe for .{}", extension)
    }
}

fn join_failures(failures: &[ProbeError]) -> String {
    let reasons: Vec<String> = failures.iter().map(ToString::to_string).collect();
    format!("all probes failed ({})", reasons.join("; "))
}

impl ProbeError {
    /// Creates a probe failure.
    pub fn failed(method: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            method,
            message: message.into(),
        }
    }

    /// Maps an I/O error from opening `path`, keeping not-found distinct.
    pub fn from_io(method: &'static str, path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Self::FileNotFound(path.to_path_buf())
        } else {
            Self::failed(method, err.to_string())
        }
    }

    /// Stable error code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            ProbeError::FileNotFound(_) => "PROBE_001",
            ProbeError::Unavailable { .. } => "PROBE_002",
            ProbeError::Failed { .. } => "PROBE_003",
            ProbeError::Exhausted(_) => "PROBE_004",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ProbeError::FileNotFound(PathBuf::from("missing.wav")).to_string(),
            "file not found: missing.wav"
        );
        assert_eq!(
            ProbeError::Unavailable {
                extension: "xyz".to_string()
            }
            .to_string(),
            "no suitable probe for .xyz"
        );
        assert_eq!(
            ProbeError::Unavailable {
                extension: String::new()
            }
            .to_string(),
            "no suitable probe for files without an extension"
        );
        assert_eq!(
            ProbeError::failed("hound", "bad header").to_string(),
            "hound: bad header"
        );
    }

    #[test]
    fn test_exhausted_lists_every_failure() {
        let err = ProbeError::Exhausted(vec![
            ProbeError::failed("symphonia", "unsupported codec"),
            ProbeError::failed("hound", "no RIFF tag found"),
        ]);
        assert_eq!(
            err.to_string(),
            "all probes failed (symphonia: unsupported codec; hound: no RIFF tag found)"
        );
        assert_eq!(err.code(), "PROBE_004");
    }

    #[test]
    fn test_from_io_not_found() {
        let err = ProbeError::from_io(
            "hound",
            Path::new("gone.wav"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ProbeError::FileNotFound(_)));

        let err = ProbeError::from_io(
            "hound",
            Path::new("locked.wav"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.code(), "PROBE_003");
    }
}
