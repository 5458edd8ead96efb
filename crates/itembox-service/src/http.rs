use async_trait::async_trait;
use itembox_core::{
    CreateItem, DeleteItemResponse, FileEntry, Item, ItemPage, ListItems, UploadFile,
    UploadReceipt,
};
use reqwest::{Client, StatusCode};

use crate::{ItemService, ServiceError};

/// Async HTTP client implementation of ItemService.
/// Speaks the same wire contract as the browser front-end.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST {
        ServiceError::InvalidInput(msg)
    } else {
        ServiceError::Internal(msg)
    }
}

#[async_trait]
impl ItemService for HttpService {
    async fn list_items(&self, query: &ListItems) -> Result<ItemPage, ServiceError> {
        let mut params = Vec::new();
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = &query.last_key {
            params.push(("lastKey", cursor.encode()));
        }
        self.get_json("/items", &params).await
    }

    async fn get_item(&self, id: &str) -> Result<Item, ServiceError> {
        self.get_json(&format!("/items/{id}"), &[]).await
    }

    async fn create_item(&self, input: &CreateItem) -> Result<Item, ServiceError> {
        self.post_json("/items", input).await
    }

    async fn delete_item(&self, id: &str) -> Result<Item, ServiceError> {
        let resp: DeleteItemResponse = self.delete_json(&format!("/items/{id}")).await?;
        Ok(resp.data)
    }

    async fn upload_file(&self, input: &UploadFile) -> Result<UploadReceipt, ServiceError> {
        self.post_json("/upload", input).await
    }

    async fn list_files(&self) -> Result<Vec<FileEntry>, ServiceError> {
        self.get_json("/files", &[]).await
    }

    /// Succeeds only on a 200 from `/health`; a degraded (503) server is an error.
    async fn health(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }
}
