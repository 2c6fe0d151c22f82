//! Ordered fallback across probes.

use durcheck_core::{Measurement, DEFAULT_TEMPO_US_PER_BEAT};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::container::ContainerProbe;
use crate::error::{ProbeError, ProbeResult};
use crate::midi::{MidiProbe, MidiTimingMode};
use crate::probe::{extension_of, DurationProbe};
use crate::wav::WavProbe;

/// Probe selection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// How MIDI ticks are converted to seconds.
    pub midi_timing: MidiTimingMode,
    /// Tempo assumed before the first tempo event (microseconds per beat).
    pub default_tempo_us_per_beat: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            midi_timing: MidiTimingMode::TempoMap,
            default_tempo_us_per_beat: DEFAULT_TEMPO_US_PER_BEAT,
        }
    }
}

/// Probes tried in order; the first success wins.
#[derive(Default)]
pub struct ProbeChain {
    probes: Vec<Box<dyn DurationProbe>>,
}

impl ProbeChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a probe.
    pub fn with_probe(mut self, probe: impl DurationProbe + 'static) -> Self {
        self.probes.push(Box::new(probe));
        self
    }

    /// The standard chain: the configured MIDI probe, then the
    /// [`audio`](Self::audio) probes.
    pub fn standard(config: &ProbeConfig) -> Self {
        let mut chain = Self::new().with_probe(MidiProbe::with_mode(
            config.midi_timing,
            config.default_tempo_us_per_beat,
        ));
        chain.probes.extend(Self::audio().probes);
        chain
    }

    /// Audio probes only: `symphonia`, `hound`, `symphonia-header`.
    pub fn audio() -> Self {
        Self::new()
            .with_probe(ContainerProbe::packets())
            .with_probe(WavProbe::new())
            .with_probe(ContainerProbe::header())
    }

    /// Method names in chain order.
    pub fn names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Measures `path` with the first probe that succeeds.
    ///
    /// # Errors
    ///
    /// - [`ProbeError::FileNotFound`] if the path does not exist
    /// - [`ProbeError::Unavailable`] if no probe supports the extension
    /// - the single failure, or [`ProbeError::Exhausted`] with every
    ///   failure, if all supporting probes failed
    pub fn probe(&self, path: &Path) -> ProbeResult<Measurement> {
        if !path.exists() {
            return Err(ProbeError::FileNotFound(path.to_path_buf()));
        }

        let mut failures = Vec::new();
        for probe in self.probes.iter().filter(|p| p.supports(path)) {
            debug!(path = %path.display(), method = probe.name(), "probing");
            match probe.probe(path) {
                Ok(measurement) => return Ok(measurement),
                Err(e) => {
                    info!(
                        path = %path.display(),
                        method = probe.name(),
                        error = %e,
                        "probe failed, trying next"
                    );
                    failures.push(e);
                }
            }
        }

        match failures.len() {
            0 => Err(ProbeError::Unavailable {
                extension: extension_of(path),
            }),
            1 => Err(failures.remove(0)),
            _ => Err(ProbeError::Exhausted(failures)),
        }
    }

    /// Runs every supporting probe on `path` and returns each result.
    pub fn probe_each(&self, path: &Path) -> Vec<(&'static str, ProbeResult<Measurement>)> {
        self.probes
            .iter()
            .filter(|p| p.supports(path))
            .map(|p| (p.name(), p.probe(path)))
            .collect()
    }
}

/// Outcome of probing one file in a batch.
#[derive(Debug)]
pub struct ProbeOutcome {
    /// Path as given by the caller.
    pub path: String,
    /// Measurement or the reason it could not be taken.
    pub result: ProbeResult<Measurement>,
}

impl ProbeOutcome {
    /// Returns the measurement if probing succeeded.
    pub fn measurement(&self) -> Option<&Measurement> {
        self.result.as_ref().ok()
    }
}

/// Probes every path in order. A failure never stops the batch.
pub fn probe_files<P: AsRef<Path>>(chain: &ProbeChain, paths: &[P]) -> Vec<ProbeOutcome> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            ProbeOutcome {
                path: path.display().to_string(),
                result: chain.probe(path),
            }
        })
        .collect()
}
