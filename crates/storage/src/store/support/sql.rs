#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params_from_iter};
use std::collections::BTreeSet;

/// Ids bound per `IN (...)` list. Stays below SQLite's historical 999 variable limit.
pub(in crate::store) const IN_CHUNK: usize = 500;

pub(in crate::store) fn placeholders(count: usize) -> String {
    let mut out = String::with_capacity(count * 2);
    for idx in 0..count {
        if idx > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out
}

pub(in crate::store) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn bind_chunk(leading: &[Value], chunk: &[i64]) -> Vec<Value> {
    let mut params = leading.to_vec();
    params.extend(chunk.iter().map(|id| Value::Integer(*id)));
    params
}

/// Runs `sql` once per chunk of `ids`, substituting `{ids}` with the chunk's
/// placeholders. `leading` values bind to the `?` markers written before
/// `{ids}`.
pub(in crate::store) fn select_rows_in<T, F>(
    conn: &Connection,
    sql: &str,
    leading: &[Value],
    ids: &BTreeSet<i64>,
    mut map: F,
) -> Result<Vec<T>, StoreError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut out = Vec::new();
    let ids = ids.iter().copied().collect::<Vec<_>>();
    for chunk in ids.chunks(IN_CHUNK) {
        let sql = sql.replace("{ids}", &placeholders(chunk.len()));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bind_chunk(leading, chunk)), &mut map)?;
        for row in rows {
            out.push(row?);
        }
    }
    Ok(out)
}

pub(in crate::store) fn select_ids_in(
    conn: &Connection,
    sql: &str,
    leading: &[Value],
    ids: &BTreeSet<i64>,
) -> Result<BTreeSet<i64>, StoreError> {
    Ok(select_rows_in(conn, sql, leading, ids, |row| row.get::<_, i64>(0))?
        .into_iter()
        .collect())
}

pub(in crate::store) fn select_pairs_in(
    conn: &Connection,
    sql: &str,
    leading: &[Value],
    ids: &BTreeSet<i64>,
) -> Result<Vec<(i64, i64)>, StoreError> {
    select_rows_in(conn, sql, leading, ids, |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    })
}

pub(in crate::store) fn execute_in(
    conn: &Connection,
    sql: &str,
    leading: &[Value],
    ids: &BTreeSet<i64>,
) -> Result<usize, StoreError> {
    let mut affected = 0;
    let ids = ids.iter().copied().collect::<Vec<_>>();
    for chunk in ids.chunks(IN_CHUNK) {
        let sql = sql.replace("{ids}", &placeholders(chunk.len()));
        affected += conn.execute(&sql, params_from_iter(bind_chunk(leading, chunk)))?;
    }
    Ok(affected)
}
