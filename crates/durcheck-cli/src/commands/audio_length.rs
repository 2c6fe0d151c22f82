//! Audio length command implementation
//!
//! Measures one audio file with every audio probe that supports it, reports
//! whether the probes agree, and picks the first successful result in chain
//! order as the final length.

use anyhow::Result;
use colored::Colorize;
use durcheck_core::{format_timestamp, reconcile, Measurement, ReconcileConfig};
use durcheck_probe::{extension_of, ProbeChain, ProbeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

use super::json_output::{error_codes, JsonError};
use super::reporting::group_thousands;

/// Probes agree when their results are at most this far apart.
pub const METHOD_TOLERANCE_SECONDS: f64 = 0.001;

/// One probe's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Spread between the successful probes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodAgreement {
    pub difference_seconds: f64,
    pub tolerance_seconds: f64,
    pub agree: bool,
}

/// JSON output for the audio-length command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioLengthOutput {
    /// Whether any probe produced a length
    pub success: bool,
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub methods: Vec<MethodResult>,
    /// Present when at least two probes succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agreement: Option<MethodAgreement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_method: Option<String>,
    pub errors: Vec<JsonError>,
}

/// Measures `path` with every audio probe.
pub fn measure(chain: &ProbeChain, path: &Path) -> AudioLengthOutput {
    let file = path.display().to_string();
    let mut output = AudioLengthOutput {
        success: false,
        file: file.clone(),
        size_bytes: None,
        methods: vec![],
        agreement: None,
        final_seconds: None,
        final_method: None,
        errors: vec![],
    };

    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            let err = ProbeError::from_io("metadata", path, e);
            output
                .errors
                .push(JsonError::new(err.code(), err.to_string()).with_file(&file));
            return output;
        }
    };
    output.size_bytes = Some(size);

    let results = chain.probe_each(path);
    if results.is_empty() {
        let err = ProbeError::Unavailable {
            extension: extension_of(path),
        };
        output
            .errors
            .push(JsonError::new(err.code(), err.to_string()).with_file(&file));
        return output;
    }

    let mut measurements: Vec<Measurement> = Vec::new();
    for (method, result) in results {
        match result {
            Ok(m) => {
                debug!(method, seconds = m.seconds(), "probe succeeded");
                output.methods.push(MethodResult {
                    method: method.to_string(),
                    seconds: Some(m.seconds()),
                    error: None,
                });
                measurements.push(m);
            }
            Err(e) => output.methods.push(MethodResult {
                method: method.to_string(),
                seconds: None,
                error: Some(e.to_string()),
            }),
        }
    }

    if measurements.len() >= 2 {
        let config = ReconcileConfig::with_tolerance(METHOD_TOLERANCE_SECONDS);
        match reconcile(&measurements, &config) {
            Ok(result) => {
                output.agreement = Some(MethodAgreement {
                    difference_seconds: result.difference(),
                    tolerance_seconds: METHOD_TOLERANCE_SECONDS,
                    agree: result.within_tolerance(),
                })
            }
            Err(e) => output
                .errors
                .push(JsonError::new(error_codes::RECONCILE, e.to_string()).with_file(&file)),
        }
    }

    match measurements.first() {
        Some(first) => {
            output.success = true;
            output.final_seconds = Some(first.seconds());
            output.final_method = Some(first.method().to_string());
        }
        None => output.errors.push(
            JsonError::new(error_codes::NO_LENGTH, "no probe could determine the length")
                .with_file(&file),
        ),
    }

    output
}

/// Run the audio-length command.
///
/// # Returns
/// Exit code: 0 if any probe produced a length, 1 otherwise
pub fn run(file: &str, json_output: bool) -> Result<ExitCode> {
    let output = measure(&ProbeChain::audio(), Path::new(file));

    if json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render(&output));
    }

    if output.success {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

/// Renders the human-readable report.
pub fn render(output: &AudioLengthOutput) -> String {
    let mut lines = vec![format!("File: {}", output.file)];

    for method in &output.methods {
        match (&method.seconds, &method.error) {
            (Some(seconds), _) => lines.push(format!(
                "{:18} {:.6} seconds ({})",
                format!("{}:", method.method),
                seconds,
                format_timestamp(*seconds)
            )),
            (None, error) => lines.push(format!(
                "{:18} {} {}",
                format!("{}:", method.method),
                "ERROR:".red(),
                error.as_deref().unwrap_or("unknown error")
            )),
        }
    }

    if let Some(agreement) = &output.agreement {
        if agreement.agree {
            lines.push("Lengths match!".green().to_string());
        } else {
            lines.push(
                format!(
                    "Methods differ by: {:.6} seconds",
                    agreement.difference_seconds
                )
                .yellow()
                .to_string(),
            );
        }
    }

    if let Some(size) = output.size_bytes {
        lines.push(format!("File size: {} bytes", group_thousands(size)));
    }

    match (&output.final_seconds, &output.final_method) {
        (Some(seconds), Some(method)) => {
            lines.push(format!(
                "Final length: {:.6} seconds  [{}]",
                seconds, method
            ));
            lines.push(format_timestamp(*seconds));
        }
        _ => {
            for error in &output.errors {
                lines.push(format!("{} {}", "ERROR:".red(), error.message));
            }
        }
    }

    lines.push(String::new());
    lines.join("\n")
}
