/// Backend timestamps and "time ago" labels.
///
/// The backend stamps rows in three shapes: SQLite's `CURRENT_TIMESTAMP`
/// (`2024-05-01 12:00:00`, UTC), naive ISO 8601 from push events
/// (`2024-05-01T12:00:00.123456`), and full RFC 3339. Naive forms are taken
/// as UTC.
///
/// # Clock injection
/// All functions accept a `now: DateTime<Utc>` parameter rather than calling
/// `Utc::now()` internally. This keeps "Nm ago" labels deterministic in
/// tests without mocking or time manipulation.

use chrono::{DateTime, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses any of the backend's timestamp shapes. Returns `None` when the
/// string matches none of them.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Relative time labels
// ---------------------------------------------------------------------------

/// Formats a timestamp as a short "time ago" label:
///   < 1 minute  → "Just now"
///   < 1 hour    → "12m ago"
///   < 1 day     → "3h ago"
///   otherwise   → the calendar date, e.g. "2024-04-28"
///
/// Unparseable input is returned unchanged. Timestamps in the future count
/// as "Just now".
pub fn format_relative_time(raw: &str, now: DateTime<Utc>) -> String {
    let Some(taken) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    let seconds = (now - taken).num_seconds();

    if seconds < 60 {
        "Just now".to_string()
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else {
        taken.format("%Y-%m-%d").to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// A fixed "now" used across all tests: 2024-05-01 13:00:00 UTC.
    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
    }

    // --- Parsing ------------------------------------------------------------

    #[test]
    fn test_sqlite_timestamp_parses_as_utc() {
        let parsed = parse_timestamp("2024-05-01 12:30:00").expect("sqlite format should parse");
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn test_push_isoformat_with_microseconds_parses() {
        let parsed = parse_timestamp("2024-05-01T12:30:00.123456").expect("isoformat should parse");
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "12:30:00");
    }

    #[test]
    fn test_rfc3339_offset_is_normalised() {
        // 08:00 at -05:00 is 13:00 UTC.
        let parsed = parse_timestamp("2024-05-01T08:00:00-05:00").expect("rfc3339 should parse");
        assert_eq!(parsed, fixed_now());
    }

    #[test]
    fn test_garbage_does_not_parse() {
        assert!(parse_timestamp("not-a-datetime").is_none());
        assert!(parse_timestamp("").is_none());
    }

    // --- Relative labels ----------------------------------------------------

    #[test]
    fn test_relative_labels_at_each_boundary() {
        let now = fixed_now();
        assert_eq!(format_relative_time("2024-05-01 12:59:30", now), "Just now");
        assert_eq!(format_relative_time("2024-05-01 12:59:00", now), "1m ago");
        assert_eq!(format_relative_time("2024-05-01 12:01:00", now), "59m ago");
        assert_eq!(format_relative_time("2024-05-01 12:00:00", now), "1h ago");
        assert_eq!(format_relative_time("2024-04-30 13:00:01", now), "23h ago");
        assert_eq!(format_relative_time("2024-04-28 09:00:00", now), "2024-04-28");
    }

    #[test]
    fn test_future_timestamp_reads_as_just_now() {
        assert_eq!(format_relative_time("2024-05-01 13:05:00", fixed_now()), "Just now");
    }

    #[test]
    fn test_unparseable_timestamp_is_echoed() {
        assert_eq!(format_relative_time("yesterday-ish", fixed_now()), "yesterday-ish");
    }
}
