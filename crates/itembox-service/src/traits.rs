use async_trait::async_trait;
use itembox_core::{
    CreateItem, FileEntry, Item, ItemPage, ItemboxError, ListItems, UploadFile, UploadReceipt,
};
use thiserror::Error;

pub const MSG_ITEM_NOT_FOUND: &str = "Item not found";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ItemboxError> for ServiceError {
    fn from(e: ItemboxError) -> Self {
        ServiceError::InvalidInput(e.message().to_string())
    }
}

/// Abstraction over the item API.
///
/// The HTTP server programs against `LocalService`; tests and other Rust
/// callers reach a running server through `HttpService`.
#[async_trait]
pub trait ItemService: Send + Sync {
    // -- Items --
    async fn list_items(&self, query: &ListItems) -> Result<ItemPage, ServiceError>;
    async fn get_item(&self, id: &str) -> Result<Item, ServiceError>;
    async fn create_item(&self, input: &CreateItem) -> Result<Item, ServiceError>;
    /// Remove an item and return it. Notification of the delete is best effort.
    async fn delete_item(&self, id: &str) -> Result<Item, ServiceError>;

    // -- Files --
    async fn upload_file(&self, input: &UploadFile) -> Result<UploadReceipt, ServiceError>;
    async fn list_files(&self) -> Result<Vec<FileEntry>, ServiceError>;

    // -- Health --
    async fn health(&self) -> Result<(), ServiceError>;
}
