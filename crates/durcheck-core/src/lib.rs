//! durcheck core library
//!
//! Pure computation shared by the probes and the command-line tool. Nothing in
//! this crate performs I/O.
//!
//! # Overview
//!
//! - A [`Measurement`] is one duration derived by one probe for one source.
//! - [`reconcile`] decides whether a set of measurements agree within an
//!   absolute tolerance and reports the ones that do not.
//! - [`timing`] converts MIDI ticks to seconds, either with a single assumed
//!   tempo or by integrating a [`TempoMap`].
//!
//! # Example
//!
//! ```
//! use durcheck_core::{reconcile, Measurement, ReconcileConfig};
//!
//! let measurements = vec![
//!     Measurement::new("a.mid", 10.000, "midly"),
//!     Measurement::new("a.wav", 10.050, "symphonia"),
//! ];
//!
//! let result = reconcile(&measurements, &ReconcileConfig::default()).unwrap();
//! assert!(!result.within_tolerance());
//! assert_eq!(result.outliers().len(), 1);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error types for reconciliation, timing, and measure logs
//! - [`measurement`]: The immutable measurement record
//! - [`reconcile`]: Duration reconciliation
//! - [`timing`]: Tick-to-seconds conversion and tempo maps
//! - [`timestamp`]: `MM:SS.mmm` formatting and parsing
//! - [`measures`]: Verification of per-measure timing logs

pub mod error;
pub mod measurement;
pub mod measures;
pub mod reconcile;
pub mod timestamp;
pub mod timing;

pub use error::{MeasureLogError, ReconcileError, TimingError};
pub use measurement::Measurement;
pub use measures::{
    check_measures, parse_measure_line, parse_measure_log, verify_measure_log, MeasureCheck,
    MeasureRecord, MEASURE_TOLERANCE_SECONDS,
};
pub use reconcile::{reconcile, ReconcileConfig, ReconciliationResult, DEFAULT_TOLERANCE_SECONDS};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use timing::{
    ticks_to_seconds, MidiTiming, TempoChange, TempoMap, DEFAULT_TEMPO_US_PER_BEAT,
};
