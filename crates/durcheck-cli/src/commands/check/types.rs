//! Type definitions for the check command.

use durcheck_core::{format_timestamp, ReconciliationResult};
use durcheck_probe::ProbeOutcome;
use serde::{Deserialize, Serialize};

use super::super::json_output::JsonError;

/// Result of probing a single file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckFileResult {
    /// Path as given on the command line
    pub path: String,
    /// Measured duration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,
    /// Duration as MM:SS.mmm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Probe that produced the duration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Why no duration could be measured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckFileResult {
    pub fn from_outcome(outcome: &ProbeOutcome) -> Self {
        match &outcome.result {
            Ok(m) => Self {
                path: outcome.path.clone(),
                seconds: Some(m.seconds()),
                timestamp: Some(format_timestamp(m.seconds())),
                method: Some(m.method().to_string()),
                error: None,
            },
            Err(e) => Self {
                path: outcome.path.clone(),
                seconds: None,
                timestamp: None,
                method: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything the check command found, before rendering.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub files: Vec<CheckFileResult>,
    pub tolerance_seconds: f64,
    /// `None` when any file could not be probed.
    pub reconciliation: Option<ReconciliationResult>,
    pub errors: Vec<JsonError>,
}

impl CheckReport {
    /// Files that could not be measured.
    pub fn failed_files(&self) -> impl Iterator<Item = &CheckFileResult> {
        self.files.iter().filter(|f| !f.is_ok())
    }

    /// True when every file was measured and all durations agree.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
            && self
                .reconciliation
                .as_ref()
                .is_some_and(ReconciliationResult::within_tolerance)
    }
}

/// A file whose duration exceeds the shortest by more than the tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierEntry {
    pub path: String,
    pub seconds: f64,
    /// Amount by which this file is longer than the shortest
    pub excess_seconds: f64,
}

/// Reconciliation figures in JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub shortest_seconds: f64,
    pub longest_seconds: f64,
    pub difference_seconds: f64,
    pub within_tolerance: bool,
    pub outliers: Vec<OutlierEntry>,
}

impl From<&ReconciliationResult> for ReconciliationSummary {
    fn from(result: &ReconciliationResult) -> Self {
        Self {
            shortest_seconds: result.min_seconds(),
            longest_seconds: result.max_seconds(),
            difference_seconds: result.difference(),
            within_tolerance: result.within_tolerance(),
            outliers: result
                .outliers()
                .iter()
                .map(|m| OutlierEntry {
                    path: m.source().to_string(),
                    seconds: m.seconds(),
                    excess_seconds: result.excess_seconds(m),
                })
                .collect(),
        }
    }
}

/// JSON output for the check command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutput {
    /// Whether every file was measured and all agree
    pub success: bool,
    /// Tolerance used for the agreement check
    pub tolerance_seconds: f64,
    /// Per-file results in argument order
    pub files: Vec<CheckFileResult>,
    /// Range and outliers (absent when any file failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconciliationSummary>,
    /// Errors encountered
    pub errors: Vec<JsonError>,
}

impl CheckOutput {
    pub fn from_report(report: &CheckReport) -> Self {
        Self {
            success: report.success(),
            tolerance_seconds: report.tolerance_seconds,
            files: report.files.clone(),
            reconciliation: report.reconciliation.as_ref().map(ReconciliationSummary::from),
            errors: report.errors.clone(),
        }
    }
}
