mod sqlite;

pub use sqlite::SqliteDatabase;

use std::path::PathBuf;

use async_trait::async_trait;
use itembox_core::{Item, ItemCursor, ItemPage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Internal(String),
}

/// Key-value persistence for items.
///
/// Every call is atomic at the backend; callers do no locking of their own.
#[async_trait]
pub trait Database: Send + Sync {
    /// Return up to `limit` items with ids strictly after `start_after`, in id order.
    /// `last_key` is set only when more items remain.
    async fn scan_items(
        &self,
        limit: usize,
        start_after: Option<&ItemCursor>,
    ) -> Result<ItemPage, DbError>;

    /// Returns `DbError::NotFound` if absent.
    async fn get_item(&self, id: &str) -> Result<Item, DbError>;

    /// Insert or overwrite.
    async fn put_item(&self, item: &Item) -> Result<(), DbError>;

    /// Remove an item, returning what was stored, or `None` if there was nothing.
    async fn delete_item(&self, id: &str) -> Result<Option<Item>, DbError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), DbError>;
}

pub const DEFAULT_TABLE: &str = "items";

/// Configuration for the item table.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file path. When `None`, `data_dir()/itembox.db`.
    pub sqlite_path: Option<String>,
    /// Table holding the items. Must be a plain SQL identifier.
    pub table: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            sqlite_path: None,
            table: DEFAULT_TABLE.into(),
        }
    }
}

impl DbConfig {
    pub fn validate(&self) -> Result<(), DbError> {
        if is_valid_table_name(&self.table) {
            Ok(())
        } else {
            Err(DbError::InvalidConfig(format!(
                "table name '{}' must match [A-Za-z_][A-Za-z0-9_]*",
                self.table
            )))
        }
    }
}

/// Table names are spliced into SQL, so only identifiers are allowed.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Default data directory: `$XDG_DATA_HOME/itembox` or `~/.local/share/itembox`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("itembox")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_name_validation() {
        for ok in ["items", "DummyItems", "_t", "items_2024"] {
            assert!(is_valid_table_name(ok), "{ok} should be valid");
        }
        for bad in ["", "1items", "items;drop", "my-items", "a b", "\"x\""] {
            assert!(!is_valid_table_name(bad), "{bad} should be invalid");
        }
        assert!(!is_valid_table_name(&"a".repeat(65)));
    }

    #[test]
    fn db_config_validate() {
        assert!(DbConfig::default().validate().is_ok());
        let config = DbConfig {
            sqlite_path: None,
            table: "bad name".into(),
        };
        assert!(matches!(config.validate(), Err(DbError::InvalidConfig(_))));
    }
}
