use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use itembox_service::ServiceError;
use serde_json::{json, Value};

use crate::config::Mode;

pub const MSG_ENDPOINT_NOT_FOUND: &str = "Endpoint not found";
pub const MSG_INTERNAL: &str = "Internal server error";

/// Error half of every handler result: a status and a `{"error": ...}` body.
pub type ApiError = (StatusCode, Json<Value>);

pub fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(json!({ "error": msg })))
}

pub fn bad_request(msg: &str) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, msg)
}

/// Map a service error onto the wire.
///
/// Validation and lookup failures carry their own message. Backend failures are
/// logged and reported with `context`; the backend's text is only attached as
/// `details` in development mode.
pub fn service_error(e: ServiceError, context: &str, mode: Mode) -> ApiError {
    match e {
        ServiceError::InvalidInput(msg) => bad_request(&msg),
        ServiceError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, &msg),
        ServiceError::Internal(detail) => {
            tracing::error!(error = %detail, "{context}");
            let mut body = json!({ "error": context });
            if mode.exposes_details() {
                body["details"] = json!(detail);
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
        }
    }
}

pub async fn not_found() -> ApiError {
    error_response(StatusCode::NOT_FOUND, MSG_ENDPOINT_NOT_FOUND)
}

pub type PanicPayload = Box<dyn Any + Send + 'static>;

/// Response for a handler that panicked.
pub fn panic_response(err: PanicPayload, mode: Mode) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(error = %detail, "handler panicked");
    let mut body = json!({ "error": MSG_INTERNAL });
    if mode.exposes_details() {
        body["details"] = json!(detail);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
