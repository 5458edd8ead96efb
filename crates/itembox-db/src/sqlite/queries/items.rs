use rusqlite::{params, OptionalExtension, Row};

use itembox_core::{Item, ItemCursor, ItemPage};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_item(row: &Row) -> rusqlite::Result<Item> {
    Ok(Item {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

impl SqliteDatabase {
    pub fn scan_items_sync(
        &self,
        limit: usize,
        start_after: Option<&ItemCursor>,
    ) -> Result<ItemPage, DbError> {
        let table = self.table();
        self.with_conn(|conn| {
            // One extra row tells us whether another page exists.
            let fetch = i64::try_from(limit.saturating_add(1)).unwrap_or(i64::MAX);
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT * FROM {table}
                     WHERE (?1 IS NULL OR id > ?1)
                     ORDER BY id
                     LIMIT ?2"
                ))
                .to_db()?;
            let mut items = stmt
                .query_map(params![start_after.map(|c| c.id.as_str()), fetch], row_to_item)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;

            let last_key = if items.len() > limit {
                items.truncate(limit);
                items.last().map(Item::cursor)
            } else {
                None
            };
            Ok(ItemPage { items, last_key })
        })
    }

    pub fn get_item_sync(&self, id: &str) -> Result<Item, DbError> {
        let table = self.table();
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT * FROM {table} WHERE id = ?1"),
                params![id],
                row_to_item,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("item {id}")),
                other => DbError::Internal(other.to_string()),
            })
        })
    }

    pub fn put_item_sync(&self, item: &Item) -> Result<(), DbError> {
        let table = self.table();
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT OR REPLACE INTO {table} (id, name, description, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)"
                ),
                params![
                    item.id,
                    item.name,
                    item.description,
                    item.created_at,
                    item.updated_at
                ],
            )
            .to_db()?;
            Ok(())
        })
    }

    pub fn delete_item_sync(&self, id: &str) -> Result<Option<Item>, DbError> {
        let table = self.table();
        self.with_conn(|conn| {
            conn.query_row(
                &format!("DELETE FROM {table} WHERE id = ?1 RETURNING *"),
                params![id],
                row_to_item,
            )
            .optional()
            .to_db()
        })
    }

    pub fn ping_sync(&self) -> Result<(), DbError> {
        let table = self.table();
        self.with_conn(|conn| {
            let found: i64 = conn
                .query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    params![table],
                    |row| row.get(0),
                )
                .to_db()?;
            if found == 1 {
                Ok(())
            } else {
                Err(DbError::Internal(format!("table {table} is missing")))
            }
        })
    }
}
