//! Configuration for the `check` command.
//!
//! A JSON file may set any subset of the fields; missing fields keep their
//! defaults and command-line flags override whatever the file says.
//!
//! ```json
//! {
//!   "tolerance_seconds": 0.02,
//!   "midi_timing": "fixed_tempo",
//!   "default_tempo_us_per_beat": 600000
//! }
//! ```

use anyhow::Context;
use durcheck_core::{ReconcileConfig, ReconcileError};
use durcheck_probe::{MidiTimingMode, ProbeConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Reconciler and probe settings for one `check` run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    #[serde(flatten)]
    pub reconcile: ReconcileConfig,
    #[serde(flatten)]
    pub probe: ProbeConfig,
}

/// Values given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CheckOverrides {
    pub tolerance_seconds: Option<f64>,
    pub midi_timing: Option<MidiTimingMode>,
    pub tempo_us_per_beat: Option<u32>,
}

impl CheckConfig {
    /// Parse a configuration from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise the defaults, then applies `overrides`.
    pub fn load(path: Option<&Path>, overrides: &CheckOverrides) -> anyhow::Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = base.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Replaces every field that was given on the command line.
    pub fn with_overrides(mut self, overrides: &CheckOverrides) -> Self {
        if let Some(tolerance) = overrides.tolerance_seconds {
            self.reconcile.tolerance_seconds = tolerance;
        }
        if let Some(mode) = overrides.midi_timing {
            self.probe.midi_timing = mode;
        }
        if let Some(tempo) = overrides.tempo_us_per_beat {
            self.probe.default_tempo_us_per_beat = tempo;
        }
        self
    }

    /// Rejects settings no run could succeed with.
    ///
    /// The tolerance is checked here as well as in the reconciler so that a
    /// bad value is reported even when a probe fails first.
    pub fn validate(&self) -> anyhow::Result<()> {
        let tolerance = self.reconcile.tolerance_seconds;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ReconcileError::InvalidTolerance(tolerance).into());
        }
        if self.probe.default_tempo_us_per_beat == 0 {
            anyhow::bail!("default tempo must be greater than zero microseconds per beat");
        }
        Ok(())
    }
}
