//! POST /ISAPI/ContentMgmt/search
//!
//! Always answers 200. An unusable time window produces an empty match list.

use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};
use isapi_common::recording::{self, SearchRequest};
use isapi_common::time;
use tracing::info;

/// Synthesize recordings for the window in `body`
pub fn search(body: &str) -> Response {
    let request = SearchRequest::from_xml(body);
    let result = recording::search(&request, time::now());

    info!(
        track_id = %request.track_id,
        matches = result.num_of_matches(),
        "Returning synthetic recordings"
    );

    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/xml")],
        result.to_xml(),
    )
        .into_response()
}
