//! Synthetic recording search
//!
//! There is no storage behind the mock. A search for a time window is
//! answered by cutting the window into fixed 20-minute slices and reporting
//! each slice as a continuous recording on the requested track.
//!
//! Bad input never fails the search: a window that cannot be read yields an
//! empty (but successful) result.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::time::{format_rtsp_time, format_search_time, parse_search_time, TimeParseError};
use crate::xml::{escape_text, extract_text};

/// Length of one synthetic recording
pub const SLICE_MINUTES: i64 = 20;

/// Upper bound on entries per search
pub const MAX_MATCHES: usize = 10;

/// Track reported when the request names none
pub const DEFAULT_TRACK_ID: &str = "101";

pub const EVENT_TYPE_CONTINUOUS: &str = "continuous";

pub const CONTENT_TYPE_VIDEO: &str = "video";

// ========================================
// Window Slicing
// ========================================

/// Bounded iterator over consecutive sub-intervals of a window
///
/// Yields `(start, end)` pairs of at most `slice` length, the last one
/// clipped to the window end. Stops at the window end or after `max_slices`
/// items, whichever comes first. An empty or inverted window yields nothing.
#[derive(Debug, Clone)]
pub struct WindowSlicer {
    cursor: NaiveDateTime,
    end: NaiveDateTime,
    slice: Duration,
    remaining: usize,
}

impl WindowSlicer {
    /// Slicer with the search defaults (20-minute slices, 10 at most)
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self::with_limits(start, end, Duration::minutes(SLICE_MINUTES), MAX_MATCHES)
    }

    pub fn with_limits(
        start: NaiveDateTime,
        end: NaiveDateTime,
        slice: Duration,
        max_slices: usize,
    ) -> Self {
        Self {
            cursor: start,
            end,
            slice,
            remaining: max_slices,
        }
    }
}

impl Iterator for WindowSlicer {
    type Item = (NaiveDateTime, NaiveDateTime);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.cursor >= self.end || self.slice <= Duration::zero() {
            return None;
        }

        let start = self.cursor;
        let end = start
            .checked_add_signed(self.slice)
            .map_or(self.end, |t| t.min(self.end));

        self.cursor = end;
        self.remaining -= 1;
        Some((start, end))
    }
}

// ========================================
// Request
// ========================================

/// Fields read from a `CMSearchDescription` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub track_id: String,
}

/// Why a search window could not be determined
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchWindowError {
    #[error("missing <{0}>")]
    MissingField(&'static str),

    #[error(transparent)]
    InvalidTime(#[from] TimeParseError),
}

impl SearchRequest {
    /// Read the search fields from a raw request body
    pub fn from_xml(body: &str) -> Self {
        Self {
            start_time: extract_text(body, "startTime"),
            end_time: extract_text(body, "endTime"),
            track_id: extract_text(body, "trackID")
                .unwrap_or_else(|| DEFAULT_TRACK_ID.to_string()),
        }
    }

    /// Parse both window bounds
    pub fn window(&self) -> Result<(NaiveDateTime, NaiveDateTime), SearchWindowError> {
        let start = self
            .start_time
            .as_deref()
            .ok_or(SearchWindowError::MissingField("startTime"))?;
        let end = self
            .end_time
            .as_deref()
            .ok_or(SearchWindowError::MissingField("endTime"))?;

        Ok((parse_search_time(start)?, parse_search_time(end)?))
    }
}

// ========================================
// Result
// ========================================

/// One synthetic recording segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingEntry {
    pub source_id: String,
    pub track_id: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub event_type: &'static str,
    pub playback_uri: String,
    pub download_path: String,
}

impl RecordingEntry {
    pub fn new(index: usize, track_id: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let playback_uri = format!(
            "rtsp://localhost/Streaming/tracks/{}?starttime={}",
            track_id,
            format_rtsp_time(&start)
        );
        let download_path = format!("/ISAPI/ContentMgmt/download?playbackURI={}", playback_uri);

        Self {
            source_id: format!("mock-source-{}", index),
            track_id: track_id.to_string(),
            start,
            end,
            event_type: EVENT_TYPE_CONTINUOUS,
            playback_uri,
            download_path,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str(&format!(
            r#"
        <searchMatchItem>
            <sourceID>{}</sourceID>
            <trackID>{}</trackID>
            <startTime>{}</startTime>
            <endTime>{}</endTime>
            <eventType>{}</eventType>
            <mediaSegmentDescriptor>
                <contentType>{}</contentType>
                <playbackURI>{}</playbackURI>
            </mediaSegmentDescriptor>
            <downloadPath>{}</downloadPath>
        </searchMatchItem>"#,
            escape_text(&self.source_id),
            escape_text(&self.track_id),
            format_search_time(&self.start),
            format_search_time(&self.end),
            self.event_type,
            CONTENT_TYPE_VIDEO,
            escape_text(&self.playback_uri),
            escape_text(&self.download_path),
        ));
    }
}

/// A complete `CMSearchResult`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub search_id: String,
    pub entries: Vec<RecordingEntry>,
}

impl SearchResult {
    pub fn num_of_matches(&self) -> usize {
        self.entries.len()
    }

    /// Render the `<CMSearchResult>` document
    pub fn to_xml(&self) -> String {
        let mut items = String::new();
        for entry in &self.entries {
            entry.write_xml(&mut items);
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<CMSearchResult>
    <searchID>{}</searchID>
    <responseStatus>true</responseStatus>
    <responseStatusStrg>OK</responseStatusStrg>
    <numOfMatches>{}</numOfMatches>
    <matchList>{}
    </matchList>
</CMSearchResult>"#,
            escape_text(&self.search_id),
            self.num_of_matches(),
            items,
        )
    }
}

/// Answer a search request
///
/// `now` only feeds the search id; entries depend on the request alone.
pub fn search(request: &SearchRequest, now: DateTime<Utc>) -> SearchResult {
    let entries = match request.window() {
        Ok((start, end)) => WindowSlicer::new(start, end)
            .enumerate()
            .map(|(index, (from, to))| RecordingEntry::new(index, &request.track_id, from, to))
            .collect(),
        Err(e) => {
            warn!("Search window rejected, returning no matches: {}", e);
            Vec::new()
        }
    };

    SearchResult {
        search_id: format!("mock-search-{}", now.timestamp()),
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn body(start: &str, end: &str) -> String {
        format!(
            "<CMSearchDescription><trackList><trackID>201</trackID></trackList>\
             <timeSpanList><timeSpan><startTime>{}</startTime><endTime>{}</endTime>\
             </timeSpan></timeSpanList></CMSearchDescription>",
            start, end
        )
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    // =========================================================================
    // WindowSlicer
    // =========================================================================

    #[test]
    fn test_slicer_exact_slice() {
        let slices: Vec<_> = WindowSlicer::new(at(8, 0), at(8, 20)).collect();
        assert_eq!(slices, vec![(at(8, 0), at(8, 20))]);
    }

    #[test]
    fn test_slicer_clips_last_slice() {
        let slices: Vec<_> = WindowSlicer::new(at(8, 0), at(8, 45)).collect();
        assert_eq!(
            slices,
            vec![
                (at(8, 0), at(8, 20)),
                (at(8, 20), at(8, 40)),
                (at(8, 40), at(8, 45)),
            ]
        );
    }

    #[test]
    fn test_slicer_caps_long_windows() {
        let slices: Vec<_> = WindowSlicer::new(at(0, 0), at(23, 0)).collect();
        assert_eq!(slices.len(), MAX_MATCHES);
        assert_eq!(slices[9], (at(3, 0), at(3, 20)));
        assert!(slices.iter().all(|(s, e)| e > s && *e <= at(23, 0)));
    }

    #[test]
    fn test_slicer_exactly_two_hundred_minutes() {
        let slices: Vec<_> = WindowSlicer::new(at(0, 0), at(3, 20)).collect();
        assert_eq!(slices.len(), 10);
        assert_eq!(slices[9].1, at(3, 20));
    }

    #[test]
    fn test_slicer_empty_and_inverted_windows() {
        assert_eq!(WindowSlicer::new(at(8, 0), at(8, 0)).count(), 0);
        assert_eq!(WindowSlicer::new(at(9, 0), at(8, 0)).count(), 0);
    }

    #[test]
    fn test_slicer_custom_limits() {
        let slices: Vec<_> =
            WindowSlicer::with_limits(at(8, 0), at(9, 0), Duration::minutes(25), 2).collect();
        assert_eq!(slices, vec![(at(8, 0), at(8, 25)), (at(8, 25), at(8, 50))]);

        let none = WindowSlicer::with_limits(at(8, 0), at(9, 0), Duration::zero(), 5);
        assert_eq!(none.count(), 0);
    }

    #[test]
    fn test_slicer_slices_are_contiguous() {
        let slices: Vec<_> = WindowSlicer::new(at(1, 7), at(3, 2)).collect();
        assert_eq!(slices.first().unwrap().0, at(1, 7));
        assert_eq!(slices.last().unwrap().1, at(3, 2));
        for pair in slices.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    // =========================================================================
    // SearchRequest
    // =========================================================================

    #[test]
    fn test_request_from_xml() {
        let req = SearchRequest::from_xml(&body("2024-01-01T08:00:00Z", "2024-01-01T09:00:00Z"));
        assert_eq!(req.start_time.as_deref(), Some("2024-01-01T08:00:00Z"));
        assert_eq!(req.end_time.as_deref(), Some("2024-01-01T09:00:00Z"));
        assert_eq!(req.track_id, "201");
        assert_eq!(req.window().unwrap(), (at(8, 0), at(9, 0)));
    }

    #[test]
    fn test_request_default_track() {
        let req = SearchRequest::from_xml("<startTime>2024-01-01T08:00:00Z</startTime>");
        assert_eq!(req.track_id, DEFAULT_TRACK_ID);
        assert_eq!(req.window(), Err(SearchWindowError::MissingField("endTime")));
    }

    #[test]
    fn test_request_invalid_time() {
        let req = SearchRequest::from_xml(&body("2024-01-01", "2024-01-01T09:00:00Z"));
        assert!(matches!(req.window(), Err(SearchWindowError::InvalidTime(_))));
    }

    // =========================================================================
    // search
    // =========================================================================

    #[test]
    fn test_search_entries() {
        let req = SearchRequest::from_xml(&body("2024-01-01T08:00:00Z", "2024-01-01T08:45:00Z"));
        let result = search(&req, fixed_now());

        assert_eq!(result.search_id, format!("mock-search-{}", fixed_now().timestamp()));
        assert_eq!(result.num_of_matches(), 3);

        let first = &result.entries[0];
        assert_eq!(first.source_id, "mock-source-0");
        assert_eq!(first.track_id, "201");
        assert_eq!(first.event_type, "continuous");
        assert_eq!(
            first.playback_uri,
            "rtsp://localhost/Streaming/tracks/201?starttime=20240101T080000Z"
        );
        assert_eq!(
            first.download_path,
            "/ISAPI/ContentMgmt/download?playbackURI=rtsp://localhost/Streaming/tracks/201?starttime=20240101T080000Z"
        );

        let last = &result.entries[2];
        assert_eq!(last.source_id, "mock-source-2");
        assert_eq!((last.start, last.end), (at(8, 40), at(8, 45)));
    }

    #[test]
    fn test_search_download_embeds_playback() {
        let req = SearchRequest::from_xml(&body("2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z"));
        for entry in search(&req, fixed_now()).entries {
            assert!(entry.download_path.contains(&entry.playback_uri));
        }
    }

    #[test]
    fn test_search_bad_window_is_empty() {
        let req = SearchRequest::from_xml("<trackID>1</trackID>");
        let result = search(&req, fixed_now());
        assert_eq!(result.num_of_matches(), 0);

        let xml = result.to_xml();
        assert!(xml.contains("<numOfMatches>0</numOfMatches>"));
        assert!(xml.contains("<responseStatus>true</responseStatus>"));
        assert!(!xml.contains("<searchMatchItem>"));
    }

    #[test]
    fn test_search_is_deterministic_apart_from_id() {
        let req = SearchRequest::from_xml(&body("2024-01-01T08:00:00Z", "2024-01-01T10:00:00Z"));
        let a = search(&req, fixed_now());
        let b = search(&req, fixed_now() + Duration::seconds(90));
        assert_ne!(a.search_id, b.search_id);
        assert_eq!(a.entries, b.entries);
    }

    #[test]
    fn test_result_xml_layout() {
        let req = SearchRequest::from_xml(&body("2024-01-01T08:00:00Z", "2024-01-01T08:20:00Z"));
        let xml = search(&req, fixed_now()).to_xml();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<numOfMatches>1</numOfMatches>"));
        assert!(xml.contains("<startTime>2024-01-01T08:00:00Z</startTime>"));
        assert!(xml.contains("<endTime>2024-01-01T08:20:00Z</endTime>"));
        assert!(xml.contains("<contentType>video</contentType>"));
        assert!(xml.contains("<eventType>continuous</eventType>"));
        assert!(xml.ends_with("</CMSearchResult>"));
    }

    #[test]
    fn test_track_id_with_entity_round_trips() {
        let req = SearchRequest::from_xml(&format!(
            "<trackID>1&amp;2</trackID><startTime>{}</startTime><endTime>{}</endTime>",
            "2024-01-01T08:00:00Z", "2024-01-01T08:20:00Z"
        ));
        assert_eq!(req.track_id, "1&2");

        let xml = search(&req, fixed_now()).to_xml();
        assert!(xml.contains("<trackID>1&amp;2</trackID>"));
        assert!(!xml.contains("&amp;amp;"));
        assert_eq!(extract_text(&xml, "trackID").as_deref(), Some("1&2"));
    }
}
