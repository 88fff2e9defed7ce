pub mod analytics;
pub mod categories;
pub mod collections;
pub mod search;
pub mod seed;
pub mod settings;
pub mod store;
pub mod templates;
pub mod transfer;
pub mod types;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Current time at millisecond precision, the resolution timestamps are stored at.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Fixed-width RFC 3339 text (`2026-01-31T09:15:00.000Z`) so that SQL
/// `ORDER BY` on the column is chronological.
pub fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp column back into UTC.
pub fn timestamp_from_sql(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Truncate text to `max_chars` characters, appending "..." if truncated.
pub fn truncate_preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_round_trip_at_millis() {
        let now = now_millis();
        let text = timestamp_to_sql(&now);
        assert!(text.ends_with('Z'));
        assert_eq!(timestamp_from_sql(0, &text).unwrap(), now);
    }

    #[test]
    fn sql_timestamps_sort_chronologically() {
        let a = DateTime::parse_from_rfc3339("2024-01-01T09:00:00Z").unwrap().with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2024-01-01T09:00:00.5Z").unwrap().with_timezone(&Utc);
        assert!(timestamp_to_sql(&a) < timestamp_to_sql(&b));
    }

    #[test]
    fn truncate_preview_respects_char_boundaries() {
        assert_eq!(truncate_preview("short", 10), "short");
        assert_eq!(truncate_preview("héllo wörld", 5), "héllo...");
    }
}
