mod local;
#[cfg(feature = "s3")]
mod s3;

pub use local::LocalStore;
#[cfg(feature = "s3")]
pub use s3::S3Store;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use itembox_core::{FileEntry, UploadReceipt};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// A bucket of opaque blobs keyed by relative paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket, as reported in upload receipts.
    fn bucket(&self) -> &str;

    /// Write (create or overwrite) an object.
    async fn upload(&self, key: &str, data: Bytes) -> Result<UploadReceipt, StoreError>;

    /// List every object in the bucket, sorted by key.
    async fn list(&self) -> Result<Vec<FileEntry>, StoreError>;
}

// -- Configuration --

/// Bucket name reported by the local backend when none is configured.
pub const DEFAULT_LOCAL_BUCKET: &str = "local";

/// Configuration for the object store backend.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// S3-compatible endpoint URL (e.g., "https://s3.us-east-1.amazonaws.com").
    /// When `None`, use local filesystem.
    pub endpoint_url: Option<String>,
    /// S3 region (e.g., "us-east-1").
    pub region: Option<String>,
    /// Bucket name.
    pub bucket: Option<String>,
    /// AWS access key ID.
    pub access_key_id: Option<String>,
    /// AWS secret access key.
    pub secret_access_key: Option<String>,
    /// Local filesystem base directory (used when S3 is not configured).
    pub local_data_dir: Option<String>,
}

impl StoreConfig {
    /// Build from environment variables.
    /// `ITEMBOX_S3_*` take precedence over the generic `AWS_*` / `S3_BUCKET` names.
    pub fn from_env() -> Self {
        fn var(primary: &str, fallback: &str) -> Option<String> {
            std::env::var(primary)
                .or_else(|_| std::env::var(fallback))
                .ok()
                .filter(|v| !v.is_empty())
        }
        Self {
            endpoint_url: var("ITEMBOX_S3_ENDPOINT", "AWS_ENDPOINT_URL"),
            region: var("ITEMBOX_S3_REGION", "AWS_REGION"),
            bucket: var("ITEMBOX_S3_BUCKET", "S3_BUCKET"),
            access_key_id: var("ITEMBOX_S3_ACCESS_KEY_ID", "AWS_ACCESS_KEY_ID"),
            secret_access_key: var("ITEMBOX_S3_SECRET_ACCESS_KEY", "AWS_SECRET_ACCESS_KEY"),
            local_data_dir: std::env::var("ITEMBOX_FILES_DIR").ok(),
        }
    }

    pub fn is_s3(&self) -> bool {
        self.endpoint_url.is_some()
            && self.access_key_id.is_some()
            && self.secret_access_key.is_some()
            && self.bucket.is_some()
    }

    pub fn bucket_name(&self) -> &str {
        self.bucket.as_deref().unwrap_or(DEFAULT_LOCAL_BUCKET)
    }
}

/// `$XDG_DATA_HOME/itembox/files`, falling back to `~/.local/share`.
fn default_files_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("itembox").join("files")
}

// -- Factory --

/// Create an `ObjectStore` from configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    if config.is_s3() {
        #[cfg(feature = "s3")]
        {
            Ok(Arc::new(S3Store::new(config)?))
        }
        #[cfg(not(feature = "s3"))]
        {
            Err(StoreError::Internal(
                "S3 configuration detected but the 's3' feature is not enabled".into(),
            ))
        }
    } else {
        Ok(Arc::new(LocalStore::new(config)))
    }
}
