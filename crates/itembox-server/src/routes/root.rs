use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(root))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Backend is running",
        "endpoints": {
            "health": "GET /health",
            "listItems": "GET /items",
            "getItem": "GET /items/{id}",
            "createItem": "POST /items",
            "deleteItem": "DELETE /items/{id}",
            "uploadFile": "POST /upload",
            "listFiles": "GET /files",
        }
    }))
}
