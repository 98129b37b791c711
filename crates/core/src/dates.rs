//! Date normalization into the dashboard's `dd/MM/yyyy` display format.
//!
//! Each store encodes dates differently:
//!
//! - App Store and Microsoft Store return ISO-8601 timestamps.
//! - Google Play renders English text such as `Oct 27, 2023`.
//! - Huawei AppGallery returns `D/M/YYYY` with unpadded components.
//!
//! ISO timestamps are converted to their UTC calendar date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::UNKNOWN;

/// Output format for every normalized date.
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Formats tried, in order, against Google Play "Updated on" text.
/// `%b` only matches abbreviated month names, so full names need `%B`.
const GOOGLE_PLAY_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y-%m-%d",
];

/// Normalize an ISO-like timestamp to `dd/MM/yyyy`.
///
/// Malformed input degrades to [`UNKNOWN`] instead of failing.
pub fn format_iso_date(raw: &str) -> String {
    parse_iso_date(raw)
        .map(|d| d.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Normalize Google Play "Updated on" text to `dd/MM/yyyy`.
///
/// Unparsable text is returned as-is (trimmed): the page-provided wording is
/// still more useful on the dashboard than the unknown sentinel.
pub fn parse_google_play_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return UNKNOWN.to_string();
    }

    GOOGLE_PLAY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(|d| d.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Left-pad the day and month of a `D/M/YYYY` date to two digits.
///
/// Components are never reordered: the source is assumed to be day-first.
/// Anything that is not three `/`-separated parts is returned unchanged.
pub fn pad_day_month(raw: &str) -> String {
    let parts: Vec<&str> = raw.split('/').collect();
    match parts.as_slice() {
        [day, month, year] => format!("{:0>2}/{:0>2}/{}", day.trim(), month.trim(), year.trim()),
        _ => raw.to_string(),
    }
}
