//! `MM:SS.mmm` timestamps.

/// Formats seconds as `MM:SS.mmm`.
///
/// Minutes are not wrapped into hours, so a 75 minute file prints as
/// `75:00.000`. Negative inputs are clamped to zero. The value is rounded
/// to whole milliseconds before it is split, so the seconds field never
/// reads `60.000`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let minutes = total_millis / 60_000;
    let millis = total_millis % 60_000;
    format!("{:02}:{:02}.{:03}", minutes, millis / 1000, millis % 1000)
}

/// Parses an `M:SS.sss` timestamp into seconds.
///
/// Returns `None` unless the input is exactly one `minutes:seconds` pair of
/// non-negative numbers.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let (minutes, seconds) = text.trim().split_once(':')?;
    let minutes: f64 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    if !minutes.is_finite() || !seconds.is_finite() || minutes < 0.0 || seconds < 0.0 {
        return None;
    }
    Some(minutes * 60.0 + seconds)
}
