//! Date formatting helpers for the Japanese-language UI

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Format a timestamp as a Japanese long-form date, e.g. `2025年8月6日`
pub fn format_ja_date(dt: &DateTime<Utc>) -> String {
    format!("{}年{}月{}日", dt.year(), dt.month(), dt.day())
}

/// Format a date as `YYYY/MM` for trend chart axes, e.g. `2024/03`
pub fn format_year_month(date: &NaiveDate) -> String {
    format!("{}/{:02}", date.year(), date.month())
}

/// Parse a timestamp in any of the formats upstream providers emit:
/// RFC 3339 (tagged-article API), plain `YYYY-MM-DD` (search provider),
/// or RFC 2822 (RSS feeds). Returns None for anything else.
pub fn parse_flexible_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
    }
    None
}
