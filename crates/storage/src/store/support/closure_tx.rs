#![forbid(unsafe_code)]

//! Closure index over the node trees.
//!
//! `node_closure` holds one `(ancestor, descendant, depth)` row per pair of
//! nodes on the same root-to-leaf chain, including a depth-0 self row per
//! node. Reads never recurse; every structural write keeps the relation
//! complete inside the caller's transaction.

use super::super::{ClosureEdge, StoreError};
use super::sql::{execute_in, select_ids_in, select_rows_in, text};
use rusqlite::{Connection, Transaction, params};
use std::collections::{BTreeMap, BTreeSet};
use tm_core::ids::NodeId;
use tm_core::model::TreeKind;

/// Self row plus a copy of every edge ending at `parent_id`, one hop deeper.
pub(in crate::store) fn closure_on_node_inserted_tx(
    tx: &Transaction<'_>,
    tree_kind: TreeKind,
    node_id: NodeId,
    parent_id: Option<NodeId>,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO node_closure(tree_kind, ancestor_id, descendant_id, depth) VALUES (?1, ?2, ?2, 0)",
        params![tree_kind.as_str(), node_id],
    )?;
    if let Some(parent_id) = parent_id {
        tx.execute(
            r#"
            INSERT INTO node_closure(tree_kind, ancestor_id, descendant_id, depth)
            SELECT tree_kind, ancestor_id, ?3, depth + 1
            FROM node_closure
            WHERE tree_kind = ?1 AND descendant_id = ?2
            "#,
            params![tree_kind.as_str(), parent_id, node_id],
        )?;
    }
    Ok(())
}

/// Drops every edge mentioning `node_id`. The caller guarantees the node has
/// no remaining children.
pub(in crate::store) fn closure_on_node_deleted_tx(
    tx: &Transaction<'_>,
    tree_kind: TreeKind,
    node_id: NodeId,
) -> Result<usize, StoreError> {
    Ok(tx.execute(
        "DELETE FROM node_closure WHERE tree_kind=?1 AND (ancestor_id=?2 OR descendant_id=?2)",
        params![tree_kind.as_str(), node_id],
    )?)
}

/// Re-derives the edges of the subtree rooted at `node_id` after it moved
/// under `new_parent_id`.
pub(in crate::store) fn closure_reattach_subtree_tx(
    tx: &Transaction<'_>,
    tree_kind: TreeKind,
    node_id: NodeId,
    new_parent_id: Option<NodeId>,
) -> Result<(), StoreError> {
    let subtree = subtree_of(tx, tree_kind, node_id)?;
    let outside_ancestors = proper_ancestors_of_any(tx, tree_kind, &BTreeSet::from([node_id]))?;

    // Edges from ancestors outside the subtree into it.
    for ancestor_id in &outside_ancestors {
        execute_in(
            tx,
            "DELETE FROM node_closure WHERE tree_kind=? AND ancestor_id=? AND descendant_id IN ({ids})",
            &[text(tree_kind.as_str()), (*ancestor_id).into()],
            &subtree,
        )?;
    }

    if let Some(new_parent_id) = new_parent_id {
        tx.execute(
            r#"
            INSERT INTO node_closure(tree_kind, ancestor_id, descendant_id, depth)
            SELECT above.tree_kind, above.ancestor_id, below.descendant_id, above.depth + below.depth + 1
            FROM node_closure AS above, node_closure AS below
            WHERE above.tree_kind = ?1 AND above.descendant_id = ?2
              AND below.tree_kind = ?1 AND below.ancestor_id = ?3
            "#,
            params![tree_kind.as_str(), new_parent_id, node_id],
        )?;
    }
    Ok(())
}

/// Proper ancestors ordered root first.
pub(in crate::store) fn ancestors_of(
    conn: &Connection,
    tree_kind: TreeKind,
    node_id: NodeId,
) -> Result<Vec<NodeId>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT ancestor_id FROM node_closure \
         WHERE tree_kind=?1 AND descendant_id=?2 AND depth > 0 \
         ORDER BY depth DESC",
    )?;
    let rows = stmt.query_map(params![tree_kind.as_str(), node_id], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Union of the proper ancestors of `ids`.
pub(in crate::store) fn proper_ancestors_of_any(
    conn: &Connection,
    tree_kind: TreeKind,
    ids: &BTreeSet<NodeId>,
) -> Result<BTreeSet<NodeId>, StoreError> {
    select_ids_in(
        conn,
        "SELECT DISTINCT ancestor_id FROM node_closure \
         WHERE tree_kind=? AND depth > 0 AND descendant_id IN ({ids})",
        &[text(tree_kind.as_str())],
        ids,
    )
}

/// Nodes at any depth below `ids`, excluding `ids` themselves unless one
/// lies below another.
pub(in crate::store) fn descendants_of(
    conn: &Connection,
    tree_kind: TreeKind,
    ids: &BTreeSet<NodeId>,
) -> Result<BTreeSet<NodeId>, StoreError> {
    select_ids_in(
        conn,
        "SELECT DISTINCT descendant_id FROM node_closure \
         WHERE tree_kind=? AND depth > 0 AND ancestor_id IN ({ids})",
        &[text(tree_kind.as_str())],
        ids,
    )
}

pub(in crate::store) fn first_level_descendants_of(
    conn: &Connection,
    tree_kind: TreeKind,
    ids: &BTreeSet<NodeId>,
) -> Result<BTreeSet<NodeId>, StoreError> {
    select_ids_in(
        conn,
        "SELECT descendant_id FROM node_closure \
         WHERE tree_kind=? AND depth = 1 AND ancestor_id IN ({ids})",
        &[text(tree_kind.as_str())],
        ids,
    )
}

/// `node_id` and everything below it.
pub(in crate::store) fn subtree_of(
    conn: &Connection,
    tree_kind: TreeKind,
    node_id: NodeId,
) -> Result<BTreeSet<NodeId>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT descendant_id FROM node_closure WHERE tree_kind=?1 AND ancestor_id=?2",
    )?;
    let rows = stmt.query_map(params![tree_kind.as_str(), node_id], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(rows.collect::<Result<BTreeSet<_>, _>>()?)
}

/// Hop count from each node up to its top-level ancestor.
pub(in crate::store) fn depths_of(
    conn: &Connection,
    tree_kind: TreeKind,
    ids: &BTreeSet<NodeId>,
) -> Result<BTreeMap<NodeId, i64>, StoreError> {
    let pairs = select_rows_in(
        conn,
        "SELECT descendant_id, MAX(depth) FROM node_closure \
         WHERE tree_kind=? AND descendant_id IN ({ids}) \
         GROUP BY descendant_id",
        &[text(tree_kind.as_str())],
        ids,
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;
    Ok(pairs.into_iter().collect())
}

pub(in crate::store) fn closure_edges(
    conn: &Connection,
    tree_kind: TreeKind,
) -> Result<Vec<ClosureEdge>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT ancestor_id, descendant_id, depth FROM node_closure \
         WHERE tree_kind=?1 ORDER BY ancestor_id, descendant_id",
    )?;
    let rows = stmt.query_map(params![tree_kind.as_str()], |row| {
        Ok(ClosureEdge {
            ancestor_id: row.get(0)?,
            descendant_id: row.get(1)?,
            depth: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
