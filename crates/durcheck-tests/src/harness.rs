//! Test harness utilities for running the CLI binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of running the durcheck binary.
#[derive(Debug)]
pub struct CliResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    /// Create a CliResult from a Command Output.
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Run `binary` with `args`, with colors disabled.
    pub fn run(binary: impl AsRef<Path>, args: &[&str]) -> Self {
        Self::run_with_stdin(binary, args, "")
    }

    /// Run `binary` with `args`, feeding `stdin` to the process.
    pub fn run_with_stdin(binary: impl AsRef<Path>, args: &[&str], stdin: &str) -> Self {
        let child = Command::new(binary.as_ref())
            .args(args)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                return Self {
                    success: false,
                    exit_code: -1,
                    stdout: String::new(),
                    stderr: format!("Failed to run CLI: {}", e),
                }
            }
        };

        if let Some(mut handle) = child.stdin.take() {
            // The process may exit without reading stdin.
            let _ = handle.write_all(stdin.as_bytes());
        }

        match child.wait_with_output() {
            Ok(out) => Self::from_output(out),
            Err(e) => Self {
                success: false,
                exit_code: -1,
                stdout: String::new(),
                stderr: format!("Failed to wait for CLI: {}", e),
            },
        }
    }

    /// Assert that the command succeeded.
    pub fn assert_success(&self) {
        assert!(
            self.success,
            "Command failed with exit code {}.\nstdout: {}\nstderr: {}",
            self.exit_code, self.stdout, self.stderr
        );
    }

    /// Assert that the command exited with status 1.
    pub fn assert_failure(&self) {
        assert_eq!(
            self.exit_code, 1,
            "Expected exit code 1.\nstdout: {}\nstderr: {}",
            self.stdout, self.stderr
        );
    }
}
