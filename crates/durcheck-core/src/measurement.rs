//! The measurement record produced by probes and consumed by the reconciler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One duration derived by one probe.
///
/// Measurements are immutable once created: probes construct them and the
/// reconciler only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    source: String,
    seconds: f64,
    method: String,
}

impl Measurement {
    /// Creates a measurement.
    ///
    /// The value is not validated here; [`crate::reconcile`] rejects negative
    /// and non-finite durations.
    pub fn new(source: impl Into<String>, seconds: f64, method: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            seconds,
            method: method.into(),
        }
    }

    /// File path or label the duration was derived from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Duration in seconds.
    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    /// Name of the probe that produced the duration.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns true if the duration is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.seconds.is_finite() && self.seconds >= 0.0
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.6}s [{}]", self.source, self.seconds, self.method)
    }
}
