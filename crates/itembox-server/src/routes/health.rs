use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use itembox_service::ItemService;
use serde_json::{json, Value};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness plus a probe of the item table.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    match state.service.health().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "OK",
                "timestamp": timestamp,
                "checks": { "database": { "status": "healthy" } },
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "storage probe failed");
            let mut database = json!({ "status": "unhealthy" });
            if state.mode.exposes_details() {
                database["error"] = json!(e.to_string());
            }
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "Degraded",
                    "timestamp": timestamp,
                    "error": "Storage probe failed",
                    "checks": { "database": database },
                })),
            )
        }
    }
}
