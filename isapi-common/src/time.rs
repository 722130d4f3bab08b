//! ISAPI timestamp utilities
//!
//! Search requests carry timestamps like `2024-01-01T08:00:00Z` or
//! `2024-01-01T08:00:00+08:00`. Only the leading `date-time-seconds` part is
//! significant; any zone suffix is dropped and the result is treated as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Input layout after truncation
pub const SEARCH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Number of characters kept from an incoming timestamp
pub const SEARCH_TIME_LEN: usize = 19;

/// Compact layout used inside RTSP playback locators
pub const RTSP_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Timestamp parsing error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid ISAPI timestamp '{value}': {source}")]
pub struct TimeParseError {
    pub value: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a search-window bound, ignoring everything after the seconds field
pub fn parse_search_time(raw: &str) -> Result<NaiveDateTime, TimeParseError> {
    let truncated = match raw.char_indices().nth(SEARCH_TIME_LEN) {
        Some((idx, _)) => &raw[..idx],
        None => raw,
    };

    NaiveDateTime::parse_from_str(truncated, SEARCH_TIME_FORMAT).map_err(|source| {
        TimeParseError {
            value: raw.to_string(),
            source,
        }
    })
}

/// Format a segment bound for a search result, e.g. `2024-01-01T08:00:00Z`
pub fn format_search_time(t: &NaiveDateTime) -> String {
    format!("{}Z", t.format(SEARCH_TIME_FORMAT))
}

/// Format a segment start for an RTSP locator, e.g. `20240101T080000Z`
pub fn format_rtsp_time(t: &NaiveDateTime) -> String {
    format!("{}Z", t.format(RTSP_TIME_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(parse_search_time("2024-01-01T08:30:15").unwrap(), at(8, 30, 15));
    }

    #[test]
    fn test_parse_drops_zone_suffix() {
        assert_eq!(parse_search_time("2024-01-01T08:30:15Z").unwrap(), at(8, 30, 15));
        assert_eq!(
            parse_search_time("2024-01-01T08:30:15+08:00").unwrap(),
            at(8, 30, 15)
        );
        assert_eq!(
            parse_search_time("2024-01-01T08:30:15.250Z").unwrap(),
            at(8, 30, 15)
        );
    }

    #[test]
    fn test_parse_rejects_date_only() {
        let err = parse_search_time("2024-01-01").unwrap_err();
        assert_eq!(err.value, "2024-01-01");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_search_time("").is_err());
        assert!(parse_search_time("yesterday at noon, roughly").is_err());
        assert!(parse_search_time("2024-13-01T08:00:00Z").is_err());
    }

    #[test]
    fn test_parse_multibyte_input_does_not_panic() {
        assert!(parse_search_time("二〇二四年一月一日八時三十分十五秒です").is_err());
    }

    #[test]
    fn test_format_search_time() {
        assert_eq!(format_search_time(&at(8, 5, 9)), "2024-01-01T08:05:09Z");
    }

    #[test]
    fn test_format_rtsp_time() {
        assert_eq!(format_rtsp_time(&at(8, 5, 9)), "20240101T080509Z");
    }

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }
}
