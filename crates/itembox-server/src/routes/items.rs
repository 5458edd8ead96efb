use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use itembox_core::item::MSG_INVALID_BODY;
use itembox_core::{CreateItem, DeleteItemResponse, Item, ItemPage, ListItems};
use itembox_service::ItemService;
use serde::Deserialize;
use serde_json::Value;

use super::AppState;
use crate::error::{bad_request, service_error, ApiError};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", get(get_item).delete(delete_item))
}

/// Raw query values; parsing happens in `ListItems::from_query` so bad input
/// gets the API's own messages.
#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<String>,
    #[serde(rename = "lastKey")]
    last_key: Option<String>,
}

async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ItemPage>, ApiError> {
    let Query(q) = query.map_err(|e| bad_request(&e.body_text()))?;
    let query = ListItems::from_query(q.limit.as_deref(), q.last_key.as_deref())
        .map_err(|e| bad_request(e.message()))?;
    state
        .service
        .list_items(&query)
        .await
        .map(Json)
        .map_err(|e| service_error(e, "Failed to fetch items", state.mode))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Item>, ApiError> {
    state
        .service
        .get_item(&id)
        .await
        .map(Json)
        .map_err(|e| service_error(e, "Failed to fetch item", state.mode))
}

async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let Json(body) = body.map_err(|_| bad_request(MSG_INVALID_BODY))?;
    let input = CreateItem::from_json(&body).map_err(|e| bad_request(e.message()))?;
    state
        .service
        .create_item(&input)
        .await
        .map(|item| (StatusCode::CREATED, Json(item)))
        .map_err(|e| service_error(e, "Failed to save item", state.mode))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteItemResponse>, ApiError> {
    state
        .service
        .delete_item(&id)
        .await
        .map(|item| Json(DeleteItemResponse::new(item)))
        .map_err(|e| service_error(e, "Failed to delete item", state.mode))
}
