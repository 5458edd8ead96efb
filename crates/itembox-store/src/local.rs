use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use itembox_core::file::is_safe_key;
use itembox_core::{FileEntry, UploadReceipt};

use crate::{ObjectStore, StoreConfig, StoreError};

/// Objects stored as plain files under a base directory.
pub struct LocalStore {
    base_dir: PathBuf,
    bucket: String,
}

impl LocalStore {
    pub fn new(config: &StoreConfig) -> Self {
        let base_dir = config
            .local_data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(crate::default_files_dir);
        Self {
            base_dir,
            bucket: config.bucket_name().to_string(),
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_safe_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(key))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(&self, key: &str, data: Bytes) -> Result<UploadReceipt, StoreError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Internal(format!("mkdir: {e}")))?;
        }
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| StoreError::Internal(format!("write {}: {e}", path.display())))?;
        Ok(UploadReceipt {
            key: key.to_string(),
            bucket: self.bucket.clone(),
            location: format!("file://{}", path.display()),
            etag: None,
        })
    }

    async fn list(&self) -> Result<Vec<FileEntry>, StoreError> {
        if !tokio::fs::try_exists(&self.base_dir)
            .await
            .map_err(|e| StoreError::Internal(format!("stat {}: {e}", self.base_dir.display())))?
        {
            return Ok(vec![]);
        }
        let mut entries = Vec::new();
        let mut stack = vec![self.base_dir.clone()];
        while let Some(current) = stack.pop() {
            let mut dir = match tokio::fs::read_dir(&current).await {
                Ok(d) => d,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StoreError::Internal(format!(
                        "list {}: {e}",
                        current.display()
                    )))
                }
            };
            while let Some(entry) = dir
                .next_entry()
                .await
                .map_err(|e| StoreError::Internal(format!("read_dir entry: {e}")))?
            {
                let path = entry.path();
                let meta = entry
                    .metadata()
                    .await
                    .map_err(|e| StoreError::Internal(format!("metadata: {e}")))?;
                if meta.is_dir() {
                    stack.push(path);
                    continue;
                }
                let Ok(rel) = path.strip_prefix(&self.base_dir) else {
                    continue;
                };
                let last_modified = meta
                    .modified()
                    .map(DateTime::<Utc>::from)
                    .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
                    .unwrap_or_default();
                entries.push(FileEntry {
                    key: rel.to_string_lossy().replace('\\', "/"),
                    size: meta.len(),
                    last_modified,
                    etag: None,
                });
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
