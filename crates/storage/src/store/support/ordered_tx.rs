#![forbid(unsafe_code)]

use super::super::StoreError;
use super::sql::{execute_in, placeholders, select_ids_in, select_rows_in, text};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use std::collections::{BTreeMap, BTreeSet};
use tm_core::model::{Scope, ScopeKind};
use tm_core::ordering::{self, OrderingError, Placement};

/// Rows per multi-row `INSERT`; four variables each.
const INSERT_ROWS_PER_STATEMENT: usize = 200;

pub(in crate::store) fn ordering_error(
    scope_kind: ScopeKind,
    scope_id: i64,
    source: OrderingError,
) -> StoreError {
    match source {
        OrderingError::UnknownItem { item_id } => StoreError::not_found("ordered item", item_id),
        OrderingError::PositionOutOfRange { .. } => {
            StoreError::InvalidInput("position is out of range")
        }
        source => {
            tracing::warn!(
                scope_kind = scope_kind.as_str(),
                scope_id,
                error = %source,
                "ordering invariant violated"
            );
            StoreError::OrderingInvariantViolation {
                scope_kind: scope_kind.as_str(),
                scope_id,
                source,
            }
        }
    }
}

pub(in crate::store) fn scope_placements(
    conn: &Connection,
    scope: Scope,
) -> Result<Vec<Placement>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT item_id, position FROM ordered_items \
         WHERE scope_kind=?1 AND scope_id=?2 ORDER BY position ASC",
    )?;
    let rows = stmt.query_map(params![scope.kind.as_str(), scope.id], |row| {
        Ok(Placement::new(row.get(0)?, row.get(1)?))
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Current placements of every scope in `scope_ids`, each ordered by position.
/// Scopes without rows are absent from the map.
pub(in crate::store) fn placements_by_scope(
    conn: &Connection,
    scope_kind: ScopeKind,
    scope_ids: &BTreeSet<i64>,
) -> Result<BTreeMap<i64, Vec<Placement>>, StoreError> {
    let rows = select_rows_in(
        conn,
        "SELECT scope_id, item_id, position FROM ordered_items \
         WHERE scope_kind=? AND scope_id IN ({ids}) \
         ORDER BY scope_id ASC, position ASC",
        &[text(scope_kind.as_str())],
        scope_ids,
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                Placement::new(row.get(1)?, row.get(2)?),
            ))
        },
    )?;
    let mut out = BTreeMap::<i64, Vec<Placement>>::new();
    for (scope_id, placement) in rows {
        out.entry(scope_id).or_default().push(placement);
    }
    Ok(out)
}

pub(in crate::store) fn scopes_containing(
    conn: &Connection,
    scope_kind: ScopeKind,
    item_ids: &BTreeSet<i64>,
) -> Result<BTreeSet<i64>, StoreError> {
    select_ids_in(
        conn,
        "SELECT DISTINCT scope_id FROM ordered_items WHERE scope_kind=? AND item_id IN ({ids})",
        &[text(scope_kind.as_str())],
        item_ids,
    )
}

/// Appends at `max(position) + 1`, or 0 for an empty scope.
pub(in crate::store) fn append_tx(
    tx: &Transaction<'_>,
    scope: Scope,
    item_id: i64,
) -> Result<i64, StoreError> {
    let present = tx
        .query_row(
            "SELECT 1 FROM ordered_items WHERE scope_kind=?1 AND scope_id=?2 AND item_id=?3",
            params![scope.kind.as_str(), scope.id, item_id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    if present {
        return Err(StoreError::InvalidInput(
            "item is already part of this collection",
        ));
    }

    let current_max: Option<i64> = tx.query_row(
        "SELECT MAX(position) FROM ordered_items WHERE scope_kind=?1 AND scope_id=?2",
        params![scope.kind.as_str(), scope.id],
        |row| row.get(0),
    )?;
    let position = ordering::next_position(current_max);
    tx.execute(
        "INSERT INTO ordered_items(scope_kind, scope_id, item_id, position) VALUES (?1, ?2, ?3, ?4)",
        params![scope.kind.as_str(), scope.id, item_id, position],
    )?;
    Ok(position)
}

pub(in crate::store) fn delete_scopes_tx(
    tx: &Transaction<'_>,
    scope_kind: ScopeKind,
    scope_ids: &BTreeSet<i64>,
) -> Result<usize, StoreError> {
    execute_in(
        tx,
        "DELETE FROM ordered_items WHERE scope_kind=? AND scope_id IN ({ids})",
        &[text(scope_kind.as_str())],
        scope_ids,
    )
}

/// Drops the membership rows of `item_ids` in every scope of `scope_kind`
/// without renumbering.
pub(in crate::store) fn delete_memberships_tx(
    tx: &Transaction<'_>,
    scope_kind: ScopeKind,
    item_ids: &BTreeSet<i64>,
) -> Result<usize, StoreError> {
    execute_in(
        tx,
        "DELETE FROM ordered_items WHERE scope_kind=? AND item_id IN ({ids})",
        &[text(scope_kind.as_str())],
        item_ids,
    )
}

/// Batched multi-row insert of `(scope_id, placement)` rows.
pub(in crate::store) fn insert_placements_tx(
    tx: &Transaction<'_>,
    scope_kind: ScopeKind,
    rows: &[(i64, Placement)],
) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for chunk in rows.chunks(INSERT_ROWS_PER_STATEMENT) {
        let values = (0..chunk.len())
            .map(|_| format!("({})", placeholders(4)))
            .collect::<Vec<_>>()
            .join(",");
        let sql = format!(
            "INSERT INTO ordered_items(scope_kind, scope_id, item_id, position) VALUES {values}"
        );
        let mut params = Vec::<Value>::with_capacity(chunk.len() * 4);
        for (scope_id, placement) in chunk {
            params.push(text(scope_kind.as_str()));
            params.push(Value::Integer(*scope_id));
            params.push(Value::Integer(placement.item_id));
            params.push(Value::Integer(placement.position));
        }
        inserted += tx.execute(&sql, params_from_iter(params))?;
    }
    Ok(inserted)
}

pub(in crate::store) fn move_item_tx(
    tx: &Transaction<'_>,
    scope: Scope,
    item_id: i64,
    new_position: i64,
) -> Result<Vec<Placement>, StoreError> {
    let current = scope_placements(tx, scope)?;
    let planned = ordering::move_to(&current, item_id, new_position)
        .map_err(|source| ordering_error(scope.kind, scope.id, source))?;
    if planned == current {
        return Ok(planned);
    }

    delete_scopes_tx(tx, scope.kind, &BTreeSet::from([scope.id]))?;
    let rows = planned
        .iter()
        .map(|placement| (scope.id, *placement))
        .collect::<Vec<_>>();
    insert_placements_tx(tx, scope.kind, &rows)?;
    Ok(planned)
}
