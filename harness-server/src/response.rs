use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use harness_util::HarnessError;

/// Renders a [`HarnessError`] as the JSON error body and status code its
/// `ErrorKind` maps to.
pub fn error_response(err: &HarnessError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.body())).into_response()
}
