//! Error types for reconciliation, tick conversion, and measure-log parsing.

use thiserror::Error;

/// Errors that can occur while reconciling a set of measurements.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    /// Reconciliation needs at least one measurement.
    #[error("cannot reconcile an empty set of measurements")]
    EmptyInput,

    /// A probe produced a negative or non-finite duration.
    #[error("invalid measurement from {source_name}: {seconds} seconds")]
    InvalidMeasurement {
        /// Source of the offending measurement.
        source_name: String,
        /// The rejected value.
        seconds: f64,
    },

    /// The configured tolerance is negative or non-finite.
    #[error("invalid tolerance: {0} seconds")]
    InvalidTolerance(f64),
}

/// Errors that can occur when converting MIDI ticks to seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimingError {
    /// The file declares zero ticks per beat.
    #[error("ticks per beat must be positive")]
    ZeroTicksPerBeat,

    /// A tempo of zero microseconds per beat was supplied.
    #[error("tempo must be a positive number of microseconds per beat")]
    ZeroTempo,

    /// SMPTE timing with a zero frame rate or zero ticks per frame.
    #[error("timecode timing needs a positive frame rate and ticks per frame")]
    ZeroFrameRate,
}

/// Errors that can occur when parsing a measure timing log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureLogError {
    /// The second comma-separated field is not an integer tick.
    #[error("line {line}: expected an integer tick in the second field, found {found:?}")]
    InvalidTick {
        /// 1-based line number.
        line: usize,
        /// The text that failed to parse.
        found: String,
    },

    /// A `Length:` value is not `M:SS.sss`.
    #[error("line {line}: malformed length {found:?}")]
    InvalidLength {
        /// 1-based line number.
        line: usize,
        /// The text that failed to parse.
        found: String,
    },

    /// `tpSec` is zero or does not fit in an integer.
    #[error("line {line}: tpSec must be a positive integer, found {found:?}")]
    InvalidTicksPerSecond {
        /// 1-based line number.
        line: usize,
        /// The text that failed to parse.
        found: String,
    },
}

impl MeasureLogError {
    /// Line number the error was found on.
    pub fn line(&self) -> usize {
        match self {
            MeasureLogError::InvalidTick { line, .. }
            | MeasureLogError::InvalidLength { line, .. }
            | MeasureLogError::InvalidTicksPerSecond { line, .. } => *line,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_log_error_line() {
        let err = MeasureLogError::InvalidLength {
            line: 12,
            found: "x".to_string(),
        };
        assert_eq!(err.line(), 12);
        assert_eq!(err.to_string(), "line 12: malformed length \"x\"");
    }

    #[test]
    fn test_invalid_measurement_message() {
        let err = ReconcileError::InvalidMeasurement {
            source_name: "a.wav".to_string(),
            seconds: -1.0,
        };
        assert_eq!(err.to_string(), "invalid measurement from a.wav: -1 seconds");
    }
}
