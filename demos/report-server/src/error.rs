use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use epichart::ReportError;
use serde_json::json;

/// Unified error type that renders as a JSON `{"error": "..."}` response
/// with an appropriate HTTP status code.
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ReportError> for AppError {
    fn from(e: ReportError) -> Self {
        Self {
            status: status_for(&e),
            message: e.to_string(),
        }
    }
}

/// Rejected input is the caller's fault; everything else is ours or the
/// store's.
pub fn status_for(e: &ReportError) -> StatusCode {
    match e {
        _ if e.is_rejection() => StatusCode::BAD_REQUEST,
        ReportError::DataIntegrity(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReportError::StoreTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ReportError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
