mod migrations;
mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;

use itembox_core::{Item, ItemCursor, ItemPage};

use crate::{Database, DbConfig, DbError, DEFAULT_TABLE};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
    table: Arc<str>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        config.validate()?;
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("itembox.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        tracing::debug!(path = %path.display(), table = %config.table, "opening sqlite item table");
        Self::open_path(&path, &config.table)
    }

    pub fn open_path(path: &Path, table: &str) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        Self::init(conn, table)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::open_in_memory_with_table(DEFAULT_TABLE)
    }

    pub fn open_in_memory_with_table(table: &str) -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        Self::init(conn, table)
    }

    fn init(conn: Connection, table: &str) -> Result<Self, DbError> {
        if !crate::is_valid_table_name(table) {
            return Err(DbError::InvalidConfig(format!("invalid table name '{table}'")));
        }
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            table: Arc::from(table),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(|conn| migrations::run(conn, &self.table))
    }
}

/// Map a `rusqlite::Error` into a `DbError::Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

fn join_err(e: tokio::task::JoinError) -> DbError {
    DbError::Internal(e.to_string())
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn scan_items(
        &self,
        limit: usize,
        start_after: Option<&ItemCursor>,
    ) -> Result<ItemPage, DbError> {
        let db = self.clone();
        let start_after = start_after.cloned();
        tokio::task::spawn_blocking(move || db.scan_items_sync(limit, start_after.as_ref()))
            .await
            .map_err(join_err)?
    }

    async fn get_item(&self, id: &str) -> Result<Item, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_item_sync(&id))
            .await
            .map_err(join_err)?
    }

    async fn put_item(&self, item: &Item) -> Result<(), DbError> {
        let db = self.clone();
        let item = item.clone();
        tokio::task::spawn_blocking(move || db.put_item_sync(&item))
            .await
            .map_err(join_err)?
    }

    async fn delete_item(&self, id: &str) -> Result<Option<Item>, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.delete_item_sync(&id))
            .await
            .map_err(join_err)?
    }

    async fn ping(&self) -> Result<(), DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.ping_sync())
            .await
            .map_err(join_err)?
    }
}
