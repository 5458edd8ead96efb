use rusqlite::Connection;

use super::SqliteResultExt;
use crate::DbError;

/// Create the item table if missing. `table` has already been validated as an identifier.
pub fn run(conn: &Connection, table: &str) -> Result<(), DbError> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL CHECK(length(name) > 0),
            description TEXT NOT NULL DEFAULT '',
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );
        "
    ))
    .to_db()
}
