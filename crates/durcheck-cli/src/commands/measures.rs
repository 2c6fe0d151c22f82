//! Measure log verification command
//!
//! Reads a per-measure timing log from a file or stdin and checks that each
//! measure's logged length matches the tick delta that led up to it.

use anyhow::{Context, Result};
use colored::Colorize;
use durcheck_core::{
    check_measures, parse_measure_log, MeasureCheck, MeasureLogError, MEASURE_TOLERANCE_SECONDS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use tracing::debug;

use super::json_output::{error_codes, JsonError};
use super::reporting::rule;

/// JSON output for the measures command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasuresOutput {
    /// Whether the log parsed and no measure mismatched
    pub success: bool,
    /// Number of timing lines found
    pub records: usize,
    pub tolerance_seconds: f64,
    pub checks: Vec<MeasureCheck>,
    pub mismatches: usize,
    pub errors: Vec<JsonError>,
}

impl MeasuresOutput {
    pub fn from_checks(records: usize, checks: Vec<MeasureCheck>) -> Self {
        let mismatches = checks.iter().filter(|c| c.mismatch).count();
        Self {
            success: mismatches == 0,
            records,
            tolerance_seconds: MEASURE_TOLERANCE_SECONDS,
            checks,
            mismatches,
            errors: vec![],
        }
    }

    pub fn from_error(err: &MeasureLogError) -> Self {
        Self {
            success: false,
            records: 0,
            tolerance_seconds: MEASURE_TOLERANCE_SECONDS,
            checks: vec![],
            mismatches: 0,
            errors: vec![
                JsonError::new(error_codes::MEASURE_LOG, err.to_string()).with_line(err.line())
            ],
        }
    }
}

/// Run the measures command.
///
/// # Arguments
/// * `input` - Log file to read; stdin when `None`
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if every measure matches, 1 on any mismatch or parse error
pub fn run(input: Option<&str>, json_output: bool) -> Result<ExitCode> {
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read measure log: {}", path))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read measure log from stdin")?;
            text
        }
    };

    let output = verify(&text);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let Some(error) = output.errors.first() {
            anyhow::bail!("Failed to parse measure log: {}", error.message);
        }
        print!("{}", render(&output));
    }

    if output.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Parses and checks a complete log.
pub fn verify(text: &str) -> MeasuresOutput {
    match parse_measure_log(text) {
        Ok(records) => {
            debug!(records = records.len(), "parsed measure log");
            MeasuresOutput::from_checks(records.len(), check_measures(&records))
        }
        Err(e) => MeasuresOutput::from_error(&e),
    }
}

/// Renders the human-readable report.
pub fn render(output: &MeasuresOutput) -> String {
    let mut lines = Vec::new();

    if output.records == 0 {
        lines.push("No measure lines found.".to_string());
        lines.push(String::new());
        return lines.join("\n");
    }

    for (index, check) in output.checks.iter().enumerate() {
        lines.push(format!(
            "Measure {} (line {}): tick {} -> {} ({:+}) at {} ticks/s",
            index + 2,
            check.line,
            check.start_tick,
            i128::from(check.start_tick) + check.tick_delta,
            check.tick_delta,
            check.ticks_per_second
        ));
        lines.push(format!(
            "  Calculated from ticks: {:.4} seconds",
            check.calculated_seconds
        ));
        lines.push(format!("  Logged length:         {:.4} seconds", check.logged_seconds));
        lines.push(format!("  Difference:            {:.4} seconds", check.difference));
        if check.mismatch {
            lines.push(format!("  {}", "MISMATCH!".red().bold()));
        }
    }

    lines.push(rule());
    let summary = format!(
        "{} measures, {} checked, {} mismatches (tolerance {}s)",
        output.records,
        output.checks.len(),
        output.mismatches,
        output.tolerance_seconds
    );
    if output.mismatches == 0 {
        lines.push(summary.green().to_string());
    } else {
        lines.push(summary.red().bold().to_string());
    }

    lines.push(String::new());
    lines.join("\n")
}
