//! Duration reconciliation.
//!
//! Independent decoders round sample counts, frame counts and tick
//! conversions differently, so durations are compared against an absolute
//! tolerance rather than for exact equality.

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::measurement::Measurement;


/// Default agreement tolerance: 10 ms.
pub const DEFAULT_TOLERANCE_SECONDS: f64 = 0.01;

/// Reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Maximum allowed spread between the shortest and longest measurement.
    pub tolerance_seconds: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
        }
    }
}

impl ReconcileConfig {
    /// Creates a config with the given tolerance.
    pub fn with_tolerance(tolerance_seconds: f64) -> Self {
        Self { tolerance_seconds }
    }
}

/// Outcome of reconciling a non-empty set of measurements.
///
/// Built once by [`reconcile`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    measurements: Vec<Measurement>,
    tolerance_seconds: f64,
    min_seconds: f64,
    max_seconds: f64,
    difference: f64,
    within_tolerance: bool,
    outliers: Vec<Measurement>,
}

impl ReconciliationResult {
    /// All measurements, in input order.
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Tolerance the result was computed with.
    pub fn tolerance_seconds(&self) -> f64 {
        self.tolerance_seconds
    }

    /// Shortest measured duration.
    pub fn min_seconds(&self) -> f64 {
        self.min_seconds
    }

    /// Longest measured duration.
    pub fn max_seconds(&self) -> f64 {
        self.max_seconds
    }

    /// `max_seconds - min_seconds`.
    pub fn difference(&self) -> f64 {
        self.difference
    }

    /// Whether the spread is within the tolerance.
    pub fn within_tolerance(&self) -> bool {
        self.within_tolerance
    }

    /// Measurements longer than the shortest by more than the tolerance, in
    /// input order.
    pub fn outliers(&self) -> &[Measurement] {
        &self.outliers
    }

    /// How much longer a measurement is than the shortest one.
    pub fn excess_seconds(&self, measurement: &Measurement) -> f64 {
        measurement.seconds() - self.min_seconds
    }
}

/// Reconciles a set of independently derived durations.
///
/// # Errors
///
/// - [`ReconcileError::EmptyInput`] if `measurements` is empty
/// - [`ReconcileError::InvalidMeasurement`] if any duration is negative or
///   not finite
/// - [`ReconcileError::InvalidTolerance`] if the configured tolerance is
///   negative or not finite
pub fn reconcile(
    measurements: &[Measurement],
    config: &ReconcileConfig,
) -> Result<ReconciliationResult, ReconcileError> {
    if measurements.is_empty() {
        return Err(ReconcileError::EmptyInput);
    }

    let tolerance = config.tolerance_seconds;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(ReconcileError::InvalidTolerance(tolerance));
    }

    if let Some(bad) = measurements.iter().find(|m| !m.is_valid()) {
        return Err(ReconcileError::InvalidMeasurement {
            source_name: bad.source().to_string(),
            seconds: bad.seconds(),
        });
    }

    let min_seconds = measurements
        .iter()
        .map(Measurement::seconds)
        .fold(f64::INFINITY, f64::min);
    let max_seconds = measurements
        .iter()
        .map(Measurement::seconds)
        .fold(f64::NEG_INFINITY, f64::max);
    let difference = max_seconds - min_seconds;

    let outliers = measurements
        .iter()
        .filter(|m| m.seconds() - min_seconds > tolerance)
        .cloned()
        .collect();

    Ok(ReconciliationResult {
        measurements: measurements.to_vec(),
        tolerance_seconds: tolerance,
        min_seconds,
        max_seconds,
        difference,
        within_tolerance: difference <= tolerance,
        outliers,
    })
}
