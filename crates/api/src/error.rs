//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coordinator::CoordinatorError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Coordinator-level error.
    Coordinator(CoordinatorError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Coordinator(err) => coordinator_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

fn coordinator_error_to_response(err: CoordinatorError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    match err {
        CoordinatorError::InvalidArgs(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGS", message),
        // A configuration hole is an operator defect, not a caller error.
        CoordinatorError::BadConfig(_) => {
            tracing::error!(error = %message, "fulfillment configuration rejected an order");
            (StatusCode::INTERNAL_SERVER_ERROR, "BAD_CONFIG", message)
        }
        CoordinatorError::DuplicateOrder(_) => (StatusCode::CONFLICT, "DUPLICATE_ORDER", message),
        CoordinatorError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", message),
        CoordinatorError::HungDispatch { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "HUNG_DISPATCH", message)
        }
    }
}

impl From<CoordinatorError> for ApiError {
    fn from(err: CoordinatorError) -> Self {
        ApiError::Coordinator(err)
    }
}
