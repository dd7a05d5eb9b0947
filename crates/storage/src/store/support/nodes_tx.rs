#![forbid(unsafe_code)]

use super::super::{LibraryRow, NodeRow, ProjectRow, StoreError};
use super::sql::{select_rows_in, text};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::{BTreeMap, BTreeSet};
use tm_core::ids::{LibraryId, NodeId, ProjectId};
use tm_core::model::{NodeKind, TreeKind};

const MAX_NAME_LEN: usize = 255;

type RawNode = (i64, String, i64, Option<i64>, String, String);

fn raw_node(row: &Row<'_>) -> rusqlite::Result<RawNode> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn node_from_raw(raw: RawNode) -> Result<NodeRow, StoreError> {
    let (node_id, tree_kind, library_id, parent_id, name, kind) = raw;
    Ok(NodeRow {
        node_id,
        tree_kind: TreeKind::parse(&tree_kind)?,
        library_id,
        parent_id,
        name,
        kind: NodeKind::parse(&kind)?,
    })
}

pub(in crate::store) fn validate_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidInput("name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(StoreError::InvalidInput("name is too long"));
    }
    if name.chars().any(|ch| ch.is_control()) {
        return Err(StoreError::InvalidInput("name contains control characters"));
    }
    Ok(name.to_string())
}

pub(in crate::store) fn load_node(
    conn: &Connection,
    tree_kind: TreeKind,
    node_id: NodeId,
) -> Result<Option<NodeRow>, StoreError> {
    let raw = conn
        .query_row(
            "SELECT node_id, tree_kind, library_id, parent_id, name, kind \
             FROM nodes WHERE node_id=?1 AND tree_kind=?2",
            params![node_id, tree_kind.as_str()],
            raw_node,
        )
        .optional()?;
    raw.map(node_from_raw).transpose()
}

pub(in crate::store) fn require_node(
    conn: &Connection,
    tree_kind: TreeKind,
    node_id: NodeId,
) -> Result<NodeRow, StoreError> {
    load_node(conn, tree_kind, node_id)?.ok_or(StoreError::not_found("node", node_id))
}

pub(in crate::store) fn require_leaf(
    conn: &Connection,
    tree_kind: TreeKind,
    node_id: NodeId,
    what: &'static str,
) -> Result<NodeRow, StoreError> {
    match load_node(conn, tree_kind, node_id)? {
        Some(node) if node.kind == NodeKind::Leaf => Ok(node),
        _ => Err(StoreError::not_found(what, node_id)),
    }
}

pub(in crate::store) fn load_nodes(
    conn: &Connection,
    tree_kind: TreeKind,
    ids: &BTreeSet<NodeId>,
) -> Result<BTreeMap<NodeId, NodeRow>, StoreError> {
    let raws = select_rows_in(
        conn,
        "SELECT node_id, tree_kind, library_id, parent_id, name, kind \
         FROM nodes WHERE tree_kind=? AND node_id IN ({ids})",
        &[text(tree_kind.as_str())],
        ids,
        raw_node,
    )?;
    let mut out = BTreeMap::new();
    for raw in raws {
        let node = node_from_raw(raw)?;
        out.insert(node.node_id, node);
    }
    Ok(out)
}

pub(in crate::store) fn child_named(
    conn: &Connection,
    library_id: LibraryId,
    parent_id: Option<NodeId>,
    name: &str,
) -> Result<Option<NodeId>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT node_id FROM nodes WHERE library_id=?1 AND parent_id IS ?2 AND name=?3",
            params![library_id, parent_id, name],
            |row| row.get(0),
        )
        .optional()?)
}

/// Sibling names are unique per container; `except` skips the node being renamed.
pub(in crate::store) fn ensure_name_free(
    conn: &Connection,
    library_id: LibraryId,
    parent_id: Option<NodeId>,
    name: &str,
    except: Option<NodeId>,
) -> Result<(), StoreError> {
    match child_named(conn, library_id, parent_id, name)? {
        Some(existing) if Some(existing) != except => Err(StoreError::DuplicateName {
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}

pub(in crate::store) fn load_library(
    conn: &Connection,
    library_id: LibraryId,
) -> Result<Option<LibraryRow>, StoreError> {
    let raw = conn
        .query_row(
            "SELECT library_id, project_id, tree_kind FROM libraries WHERE library_id=?1",
            params![library_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;
    raw.map(|(library_id, project_id, tree_kind)| {
        Ok::<_, StoreError>(LibraryRow {
            library_id,
            project_id,
            tree_kind: TreeKind::parse(&tree_kind)?,
        })
    })
    .transpose()
}

pub(in crate::store) fn find_library(
    conn: &Connection,
    project_id: ProjectId,
    tree_kind: TreeKind,
) -> Result<Option<LibraryId>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT library_id FROM libraries WHERE project_id=?1 AND tree_kind=?2",
            params![project_id, tree_kind.as_str()],
            |row| row.get(0),
        )
        .optional()?)
}

pub(in crate::store) fn load_project(
    conn: &Connection,
    project_id: ProjectId,
) -> Result<Option<ProjectRow>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT project_id, name FROM projects WHERE project_id=?1",
            params![project_id],
            |row| {
                Ok(ProjectRow {
                    project_id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?)
}

pub(in crate::store) fn find_project_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<ProjectRow>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT project_id, name FROM projects WHERE name=?1",
            params![name],
            |row| {
                Ok(ProjectRow {
                    project_id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?)
}
