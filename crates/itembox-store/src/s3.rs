use async_trait::async_trait;
use bytes::Bytes;
use itembox_core::file::is_safe_key;
use itembox_core::{FileEntry, UploadReceipt};
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use s3::Bucket;

use crate::{ObjectStore, StoreConfig, StoreError};

pub struct S3Store {
    bucket: Box<Bucket>,
    name: String,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.name)
            .finish_non_exhaustive()
    }
}

impl S3Store {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let region = Region::Custom {
            region: config.region.clone().unwrap_or_else(|| "us-east-1".into()),
            endpoint: config.endpoint_url.clone().unwrap_or_default(),
        };

        let credentials = Credentials::new(
            config.access_key_id.as_deref(),
            config.secret_access_key.as_deref(),
            None,
            None,
            None,
        )
        .map_err(|e| StoreError::Internal(format!("credentials: {e}")))?;

        let bucket_name = config
            .bucket
            .as_deref()
            .ok_or_else(|| StoreError::Internal("bucket name required".into()))?;

        let mut bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| StoreError::Internal(format!("bucket: {e}")))?;
        bucket.set_path_style();

        Ok(Self {
            bucket,
            name: bucket_name.to_string(),
        })
    }
}

pub(crate) fn content_type_for_key(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("json") => "application/json",
        Some("html") | Some("htm") => "text/html",
        Some("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

fn map_s3_error(e: S3Error) -> StoreError {
    StoreError::Internal(format!("s3: {e}"))
}

fn strip_quotes(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

#[async_trait]
impl ObjectStore for S3Store {
    fn bucket(&self) -> &str {
        &self.name
    }

    async fn upload(&self, key: &str, data: Bytes) -> Result<UploadReceipt, StoreError> {
        if !is_safe_key(key) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        let content_type = content_type_for_key(key);
        let response = self
            .bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(map_s3_error)?;
        if response.status_code() >= 300 {
            return Err(StoreError::Internal(format!(
                "s3 put {}: status {}",
                key,
                response.status_code()
            )));
        }
        let etag = response
            .headers()
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("etag"))
            .map(|(_, value)| strip_quotes(value));
        Ok(UploadReceipt {
            key: key.to_string(),
            bucket: self.name.clone(),
            location: format!("{}/{}", self.bucket.url(), key),
            etag,
        })
    }

    async fn list(&self) -> Result<Vec<FileEntry>, StoreError> {
        let results = self
            .bucket
            .list(String::new(), None)
            .await
            .map_err(map_s3_error)?;

        let mut entries = Vec::new();
        for result in results {
            for object in result.contents {
                entries.push(FileEntry {
                    key: object.key,
                    size: object.size,
                    last_modified: object.last_modified,
                    etag: object.e_tag.as_deref().map(strip_quotes),
                });
            }
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}
