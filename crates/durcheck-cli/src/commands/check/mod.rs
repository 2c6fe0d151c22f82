//! Duration check command implementation
//!
//! Measures every file with the standard probe chain and verifies that all
//! durations agree within a tolerance. Any file that cannot be measured
//! fails the run before the durations are compared.

mod types;

pub use types::{
    CheckFileResult, CheckOutput, CheckReport, OutlierEntry, ReconciliationSummary,
};

use anyhow::Result;
use colored::Colorize;
use durcheck_core::{format_timestamp, reconcile, Measurement, ReconcileConfig, ReconcileError};
use durcheck_probe::{probe_files, ProbeChain};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

use super::json_output::{error_codes, JsonError};
use super::reporting::{rule, seconds_and_millis};
use crate::config::{CheckConfig, CheckOverrides};

/// Run the check command.
///
/// # Arguments
/// * `files` - Paths to measure, in report order
/// * `config_path` - Optional JSON config file
/// * `overrides` - Values given as flags; they win over the config file
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if every file was measured and all agree, 1 otherwise
pub fn run(
    files: &[String],
    config_path: Option<&str>,
    overrides: &CheckOverrides,
    json_output: bool,
) -> Result<ExitCode> {
    if files.is_empty() {
        print_usage();
        return Ok(ExitCode::from(1));
    }

    let config = CheckConfig::load(config_path.map(Path::new), overrides)?;
    info!(
        files = files.len(),
        tolerance = config.reconcile.tolerance_seconds,
        midi_timing = ?config.probe.midi_timing,
        "checking durations"
    );

    let chain = ProbeChain::standard(&config.probe);
    let report = check_files(&chain, files, &config.reconcile);

    if json_output {
        let output = CheckOutput::from_report(&report);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render_report(&report));
    }

    if report.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn print_usage() {
    println!("Usage: durcheck check <file1> <file2> ...");
    println!();
    println!("Example:");
    println!("  durcheck check render.wav render.mp3 score.mid");
}

/// Probes `files` and reconciles the results.
///
/// Per-file failures are recorded in the report. Reconciliation only runs
/// when every file was measured; a [`ReconcileError`] (for example an
/// unusable duration) is recorded as a report error as well.
pub fn check_files(
    chain: &ProbeChain,
    files: &[String],
    config: &ReconcileConfig,
) -> CheckReport {
    let outcomes = probe_files(chain, files);

    let results: Vec<CheckFileResult> =
        outcomes.iter().map(CheckFileResult::from_outcome).collect();
    let mut errors: Vec<JsonError> = outcomes
        .iter()
        .filter_map(|o| {
            o.result
                .as_ref()
                .err()
                .map(|e| JsonError::new(e.code(), e.to_string()).with_file(&o.path))
        })
        .collect();

    let reconciliation = if errors.is_empty() {
        let measurements: Vec<Measurement> =
            outcomes.into_iter().filter_map(|o| o.result.ok()).collect();
        match reconcile(&measurements, config) {
            Ok(result) => Some(result),
            Err(e) => {
                errors.push(reconcile_error(&e));
                None
            }
        }
    } else {
        debug!(failed = errors.len(), "skipping reconciliation");
        None
    };

    CheckReport {
        files: results,
        tolerance_seconds: config.tolerance_seconds,
        reconciliation,
        errors,
    }
}

fn reconcile_error(err: &ReconcileError) -> JsonError {
    let error = JsonError::new(error_codes::RECONCILE, err.to_string());
    match err {
        ReconcileError::InvalidMeasurement { source_name, .. } => error.with_file(source_name),
        _ => error,
    }
}

/// Renders the human-readable report.
pub fn render_report(report: &CheckReport) -> String {
    let mut lines = vec![
        rule(),
        "FILE LENGTH VERIFICATION".bold().to_string(),
        rule(),
    ];

    for file in &report.files {
        match (&file.timestamp, &file.method, &file.error) {
            (Some(timestamp), Some(method), _) => {
                lines.push(format!("{:40} {}  [{}]", file.path, timestamp, method));
            }
            (_, _, error) => {
                let reason = error.as_deref().unwrap_or("unknown error");
                lines.push(format!("{:40} {} {}", file.path, "ERROR:".red(), reason));
            }
        }
    }
    lines.push(rule());

    let failed: Vec<&CheckFileResult> = report.failed_files().collect();
    if !failed.is_empty() {
        lines.push(String::new());
        lines.push(
            "ERROR: Could not read the following files:"
                .red()
                .bold()
                .to_string(),
        );
        for file in failed {
            let reason = file.error.as_deref().unwrap_or("unknown error");
            lines.push(format!("  - {}: {}", file.path, reason));
        }
        return finish(lines);
    }

    let Some(result) = &report.reconciliation else {
        lines.push(String::new());
        lines.push(
            "ERROR: Could not compare the file lengths:"
                .red()
                .bold()
                .to_string(),
        );
        for error in &report.errors {
            lines.push(format!("  - {}", error.message));
        }
        return finish(lines);
    };

    lines.push(String::new());
    lines.push("Length Range:".bold().to_string());
    lines.push(format!("  Shortest: {}", format_timestamp(result.min_seconds())));
    lines.push(format!("  Longest:  {}", format_timestamp(result.max_seconds())));
    lines.push(format!(
        "  Difference: {}",
        seconds_and_millis(result.difference())
    ));
    lines.push(String::new());

    if result.within_tolerance() {
        lines.push(
            format!(
                "✓ SUCCESS: All files match within tolerance ({}s)",
                result.tolerance_seconds()
            )
            .green()
            .bold()
            .to_string(),
        );
    } else {
        lines.push(
            format!(
                "✗ FAILURE: Files differ by {:.6}s (tolerance: {}s)",
                result.difference(),
                result.tolerance_seconds()
            )
            .red()
            .bold()
            .to_string(),
        );
        lines.push(String::new());
        lines.push("Length discrepancies detected:".to_string());
        for outlier in result.outliers() {
            lines.push(format!(
                "  {}: +{:.6}s longer than shortest",
                outlier.source(),
                result.excess_seconds(outlier)
            ));
        }
    }

    finish(lines)
}

fn finish(mut lines: Vec<String>) -> String {
    lines.push(String::new());
    lines.join("\n")
}
