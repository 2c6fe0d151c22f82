//! JSON output types for machine-readable CLI output.
//!
//! Every command accepts `--json` and then prints exactly one pretty-printed
//! document on stdout. Errors carry stable codes so that scripts do not have
//! to match on message text.

use serde::{Deserialize, Serialize};

/// Error codes for CLI operations.
///
/// These codes are stable and can be used for programmatic error handling.
/// Per-file probe failures pass through the probe codes (`PROBE_XXX`).
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// MIDI parse error
    pub const MIDI_PARSE: &str = "CLI_002";
    /// Measure log line could not be parsed
    pub const MEASURE_LOG: &str = "CLI_003";
    /// Measurements could not be reconciled
    pub const RECONCILE: &str = "CLI_004";
    /// No probe produced a length
    pub const NO_LENGTH: &str = "CLI_005";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "PROBE_001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line number (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            line: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the line number for this error.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_serialization() {
        let error = JsonError::new("PROBE_001", "file not found: a.wav").with_file("a.wav");

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"PROBE_001\""));
        assert!(json.contains("\"message\":\"file not found: a.wav\""));
        assert!(json.contains("\"file\":\"a.wav\""));
    }

    #[test]
    fn test_json_error_optional_fields_skipped() {
        let error = JsonError::new(error_codes::FILE_READ, "test error");
        let json = serde_json::to_string(&error).unwrap();

        assert!(!json.contains("\"file\""));
        assert!(!json.contains("\"line\""));
    }

    #[test]
    fn test_json_error_line() {
        let error = JsonError::new(error_codes::MEASURE_LOG, "bad tick").with_line(7);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"line\":7"));
    }
}
