//! Human-readable sequential order numbers such as `ORD241000042`.

use chrono::{DateTime, Utc};

/// Prefix for material orders
pub const MATERIAL_ORDER_PREFIX: &str = "ORD";
/// Prefix for skip-hire bookings
pub const SKIP_HIRE_PREFIX: &str = "SKP";
/// Insert attempts before a number collision is reported as a conflict
pub const MAX_ATTEMPTS: u32 = 3;

/// `{prefix}{yy}{mm}{sequence:05}`. Sequences wider than five digits are kept whole.
pub fn format_order_number(prefix: &str, at: DateTime<Utc>, sequence: u64) -> String {
    format!("{}{}{:05}", prefix, at.format("%y%m"), sequence)
}

/// Sequence for the given attempt when `existing` rows of the series are stored.
pub fn sequence_for(existing: u64, attempt: u32) -> u64 {
    existing + 1 + u64::from(attempt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 15, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(MATERIAL_ORDER_PREFIX, 2024, 10, 42, "ORD241000042")]
    #[case(SKIP_HIRE_PREFIX, 2025, 1, 1, "SKP250100001")]
    #[case(SKIP_HIRE_PREFIX, 2030, 12, 99_999, "SKP301299999")]
    fn formats_prefix_year_month_and_padded_sequence(
        #[case] prefix: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] sequence: u64,
        #[case] expected: &str,
    ) {
        assert_eq!(format_order_number(prefix, at(year, month), sequence), expected);
    }

    #[test]
    fn long_sequences_are_not_truncated() {
        assert_eq!(
            format_order_number(MATERIAL_ORDER_PREFIX, at(2024, 3), 123_456),
            "ORD2403123456"
        );
    }

    #[test]
    fn sequence_starts_after_existing_count_and_advances_per_attempt() {
        assert_eq!(sequence_for(0, 0), 1);
        assert_eq!(sequence_for(41, 0), 42);
        assert_eq!(sequence_for(41, 2), 44);
    }
}
