use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ItemboxError;

pub const MSG_FILE_REQUIRED: &str = "filename and content are required";
pub const MSG_INVALID_FILENAME: &str = "Invalid filename";

/// Body of `POST /upload`. The filename doubles as the object key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFile {
    pub filename: String,
    pub content: String,
}

impl UploadFile {
    pub fn from_json(body: &Value) -> Result<Self, ItemboxError> {
        let field = |name: &str| match body.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
        match (field("filename"), field("content")) {
            (Some(filename), Some(content)) => Ok(Self { filename, content }),
            _ => Err(ItemboxError::invalid(MSG_FILE_REQUIRED)),
        }
    }

    pub fn validate(&self) -> Result<(), ItemboxError> {
        if self.filename.is_empty() || self.content.is_empty() {
            return Err(ItemboxError::invalid(MSG_FILE_REQUIRED));
        }
        if !is_safe_key(&self.filename) {
            return Err(ItemboxError::invalid(MSG_INVALID_FILENAME));
        }
        Ok(())
    }
}

/// A key is safe when it is relative and has no empty, `.` or `..` segments.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

/// What the object store reports after an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub key: String,
    pub bucket: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// One object in a bucket listing, passed through as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}
