#![forbid(unsafe_code)]

use super::super::{EventRow, StoreError};
use rusqlite::{Connection, Transaction, params};

pub(in crate::store) fn insert_event_tx(
    tx: &Transaction<'_>,
    ts_ms: i64,
    event_type: &str,
    payload: &serde_json::Value,
) -> Result<EventRow, StoreError> {
    let payload_json = payload.to_string();
    tx.execute(
        "INSERT INTO events(ts_ms, type, payload_json) VALUES (?1, ?2, ?3)",
        params![ts_ms, event_type, payload_json],
    )?;
    Ok(EventRow {
        seq: tx.last_insert_rowid(),
        ts_ms,
        event_type: event_type.to_string(),
        payload_json,
    })
}

pub(in crate::store) fn list_events(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<EventRow>, StoreError> {
    let limit = i64::try_from(limit).map_err(|_| StoreError::InvalidInput("limit is too large"))?;
    let mut stmt = conn.prepare(
        "SELECT seq, ts_ms, type, payload_json FROM events ORDER BY seq DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        Ok(EventRow {
            seq: row.get(0)?,
            ts_ms: row.get(1)?,
            event_type: row.get(2)?,
            payload_json: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
