//! Verification of per-measure timing logs.
//!
//! A composition run logs one line per measure. The second comma-separated
//! field is the measure's absolute start tick, `tpSec: <n>` gives ticks per
//! second, and `Length: M:SS.ssss` the duration the composer believes the
//! measure has. The tick delta between consecutive lines divided by the
//! current line's `tpSec` must reproduce the current line's logged length.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MeasureLogError;
use crate::timestamp::parse_timestamp;

/// Maximum allowed gap between calculated and logged measure lengths.
pub const MEASURE_TOLERANCE_SECONDS: f64 = 0.0001;

static TICKS_PER_SECOND_REGEX: OnceLock<Regex> = OnceLock::new();
static LENGTH_REGEX: OnceLock<Regex> = OnceLock::new();

fn ticks_per_second_regex() -> &'static Regex {
    TICKS_PER_SECOND_REGEX
        .get_or_init(|| Regex::new(r"tpSec: (\d+)").expect("invalid regex pattern"))
}

fn length_regex() -> &'static Regex {
    LENGTH_REGEX.get_or_init(|| Regex::new(r"Length: ([\d:.]+)").expect("invalid regex pattern"))
}

/// One parsed log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureRecord {
    /// 1-based line number in the log.
    pub line: usize,
    /// Absolute start tick.
    pub tick: u64,
    /// Ticks per second in effect for this measure.
    pub ticks_per_second: u64,
    /// Logged measure length (0 when the line has none).
    pub logged_seconds: f64,
}

/// Comparison of one measure against the tick delta that led up to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureCheck {
    /// Line number of the later record.
    pub line: usize,
    /// Tick of the earlier record.
    pub start_tick: u64,
    /// `tick - start_tick`; negative if the log went backwards. Wide enough
    /// for any pair of `u64` ticks.
    pub tick_delta: i128,
    /// Ticks per second of the later record.
    pub ticks_per_second: u64,
    /// `tick_delta / ticks_per_second`.
    pub calculated_seconds: f64,
    /// Logged length of the later record.
    pub logged_seconds: f64,
    /// `|calculated - logged|`.
    pub difference: f64,
    /// Whether the difference exceeds [`MEASURE_TOLERANCE_SECONDS`].
    pub mismatch: bool,
}

/// Parses one log line.
///
/// Returns `Ok(None)` for lines that carry no `tpSec` value.
pub fn parse_measure_line(
    line_number: usize,
    line: &str,
) -> Result<Option<MeasureRecord>, MeasureLogError> {
    let line = line.trim();
    let ticks_per_second = match ticks_per_second_regex().captures(line) {
        Some(caps) => match caps[1].parse::<u64>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(MeasureLogError::InvalidTicksPerSecond {
                    line: line_number,
                    found: caps[1].to_string(),
                })
            }
        },
        None => return Ok(None),
    };

    let tick_field = line.split(',').nth(1).unwrap_or("").trim();
    let tick = tick_field
        .parse::<u64>()
        .map_err(|_| MeasureLogError::InvalidTick {
            line: line_number,
            found: tick_field.to_string(),
        })?;

    let logged_seconds = match length_regex().captures(line) {
        Some(caps) => parse_timestamp(&caps[1]).ok_or_else(|| MeasureLogError::InvalidLength {
            line: line_number,
            found: caps[1].to_string(),
        })?,
        None => 0.0,
    };

    Ok(Some(MeasureRecord {
        line: line_number,
        tick,
        ticks_per_second,
        logged_seconds,
    }))
}

/// Parses every line of a log, skipping lines without `tpSec`.
pub fn parse_measure_log(text: &str) -> Result<Vec<MeasureRecord>, MeasureLogError> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if let Some(record) = parse_measure_line(index + 1, line)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Checks every consecutive pair of records.
pub fn check_measures(records: &[MeasureRecord]) -> Vec<MeasureCheck> {
    records
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let tick_delta = i128::from(cur.tick) - i128::from(prev.tick);
            let calculated_seconds = tick_delta as f64 / cur.ticks_per_second as f64;
            let difference = (calculated_seconds - cur.logged_seconds).abs();
            MeasureCheck {
                line: cur.line,
                start_tick: prev.tick,
                tick_delta,
                ticks_per_second: cur.ticks_per_second,
                calculated_seconds,
                logged_seconds: cur.logged_seconds,
                difference,
                mismatch: difference > MEASURE_TOLERANCE_SECONDS,
            }
        })
        .collect()
}

/// Parses a log and checks it in one step.
pub fn verify_measure_log(text: &str) -> Result<Vec<MeasureCheck>, MeasureLogError> {
    Ok(check_measures(&parse_measure_log(text)?))
}
