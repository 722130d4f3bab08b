//! Endpoint dispatch by method and path substring
//!
//! ISAPI clients often add prefixes or query strings to endpoint paths, so
//! endpoints are recognised by substring rather than exact route match.

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::{device_info, search};

/// Path marker for the device identity endpoint
pub const DEVICE_INFO_PATH: &str = "/ISAPI/System/deviceInfo";

/// Path marker for the recording search endpoint
pub const SEARCH_PATH: &str = "/ISAPI/ContentMgmt/search";

/// Largest request body read by the dispatcher
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Emulated endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    DeviceInfo,
    Search,
}

impl Endpoint {
    /// Match a request line to an endpoint
    pub fn classify(method: &Method, path: &str) -> Option<Self> {
        if *method == Method::GET && path.contains(DEVICE_INFO_PATH) {
            Some(Endpoint::DeviceInfo)
        } else if *method == Method::POST && path.contains(SEARCH_PATH) {
            Some(Endpoint::Search)
        } else {
            None
        }
    }
}

/// Route an authenticated request to its handler
///
/// Unknown method/path combinations get 404 with an empty body.
pub async fn dispatch(request: Request) -> Response {
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    match Endpoint::classify(request.method(), &path) {
        Some(Endpoint::DeviceInfo) => device_info::device_info(),
        Some(Endpoint::Search) => {
            let body = read_body(request).await;
            search::search(&body)
        }
        None => {
            debug!(method = %request.method(), %path, "No emulated endpoint");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Read the request body as text; unreadable bodies become empty
async fn read_body(request: Request) -> String {
    match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => text,
            Err(e) => {
                warn!("Search body is not UTF-8, treating as empty: {}", e);
                String::new()
            }
        },
        Err(e) => {
            warn!("Failed to read search body, treating as empty: {}", e);
            String::new()
        }
    }
}
