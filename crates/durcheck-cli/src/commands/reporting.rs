//! Shared helpers for human-readable reports.

/// Width of the banner rule.
pub(crate) const RULE_WIDTH: usize = 80;

/// A full-width line of `=`.
pub(crate) fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

/// Formats a byte count with thousands separators, e.g. `1,234,567`.
pub(crate) fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats `seconds` with six decimals and the same value in milliseconds.
pub(crate) fn seconds_and_millis(seconds: f64) -> String {
    format!("{:.6} seconds ({:.3} ms)", seconds, seconds * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_width() {
        assert_eq!(rule().len(), 80);
        assert!(rule().chars().all(|c| c == '='));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
        assert_eq!(group_thousands(100_000), "100,000");
    }

    #[test]
    fn test_seconds_and_millis() {
        assert_eq!(seconds_and_millis(0.5), "0.500000 seconds (500.000 ms)");
    }
}
