//! durcheck probes
//!
//! A probe opens one media file with an external decoding library and reports
//! its duration as a [`Measurement`](durcheck_core::Measurement) tagged with
//! the probe's method name. This crate never parses a format itself.
//!
//! | probe | method | formats |
//! |---|---|---|
//! | [`MidiProbe::tempo_map`] | `midly` | `.mid`, `.midi` |
//! | [`MidiProbe::fixed_tempo`] | `midly-fixed-tempo` | `.mid`, `.midi` |
//! | [`ContainerProbe::packets`] | `symphonia` | `.wav`, `.mp3`, `.ogg`, `.flac` |
//! | [`WavProbe`] | `hound` | `.wav` |
//! | [`ContainerProbe::header`] | `symphonia-header` | `.wav`, `.mp3`, `.ogg`, `.flac` |
//!
//! Probes are combined into a [`ProbeChain`], which tries every probe that
//! supports a file in order and returns the first success.

pub mod chain;
pub mod container;
pub mod error;
pub mod midi;
pub mod probe;
pub mod wav;

pub use chain::{probe_files, ProbeChain, ProbeConfig, ProbeOutcome};
pub use container::{ContainerMode, ContainerProbe};
pub use error::{ProbeError, ProbeResult};
pub use midi::{analyze_midi, MidiProbe, MidiSummary, MidiTimingMode};
pub use probe::{detect_media_kind, extension_of, DurationProbe, MediaKind};
pub use wav::WavProbe;
