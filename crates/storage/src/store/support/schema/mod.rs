#![forbid(unsafe_code)]

mod sql;

use super::super::StoreError;
use rusqlite::{Connection, OptionalExtension, params};

pub(in crate::store) const SCHEMA_VERSION: &str = "v1";

pub(in crate::store) fn install_sqlite_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(&sql::full_schema_sql())?;

    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params!["schema_version"],
            |row| row.get(0),
        )
        .optional()?;
    match stored.as_deref() {
        None => {
            conn.execute(
                "INSERT INTO meta(key, value) VALUES (?1, ?2)",
                params!["schema_version", SCHEMA_VERSION],
            )?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(_) => return Err(StoreError::InvalidInput("unsupported schema version")),
    }

    Ok(())
}
