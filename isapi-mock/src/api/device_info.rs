//! GET /ISAPI/System/deviceInfo

use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};
use isapi_common::device::MOCK_DEVICE;

/// Fixed device descriptor; no request input is consulted
pub fn device_info() -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, "application/xml")],
        MOCK_DEVICE.to_xml(),
    )
        .into_response()
}
