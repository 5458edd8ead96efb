use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use itembox_core::item::MSG_INVALID_BODY;
use itembox_core::{FileEntry, UploadFile, UploadReceipt};
use itembox_service::ItemService;
use serde_json::Value;

use super::AppState;
use crate::error::{bad_request, service_error, ApiError};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/files", get(list_files))
}

async fn upload_file(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UploadReceipt>, ApiError> {
    let Json(body) = body.map_err(|_| bad_request(MSG_INVALID_BODY))?;
    let input = UploadFile::from_json(&body).map_err(|e| bad_request(e.message()))?;
    state
        .service
        .upload_file(&input)
        .await
        .map(Json)
        .map_err(|e| service_error(e, "Failed to upload file", state.mode))
}

async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<FileEntry>>, ApiError> {
    state
        .service
        .list_files()
        .await
        .map(Json)
        .map_err(|e| service_error(e, "Failed to list files", state.mode))
}
