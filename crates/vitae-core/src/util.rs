//! Shared utility functions used across multiple modules.

use chrono::{DateTime, NaiveDate, Utc};

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Render a Unix-ms timestamp as RFC 3339 (UTC, millisecond precision).
pub fn format_timestamp_ms(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |value| value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    )
}

/// Parse a loosely formatted calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM`, `YYYY` and full RFC 3339 timestamps.
/// Anything else (including the empty string) yields `None`.
pub fn parse_anchor_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    if value.len() == 4 && value.bytes().all(|byte| byte.is_ascii_digit()) {
        let year = value.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

/// Character count, the unit every text position in this crate is measured in.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}
