#![forbid(unsafe_code)]

use super::super::{MilestoneRow, StoreError};
use super::sql::{execute_in, placeholders, select_ids_in, select_pairs_in, select_rows_in, text};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use std::collections::{BTreeMap, BTreeSet};
use tm_core::ids::{MilestoneId, NodeId, RequirementVersionId};
use tm_core::milestones::{self, Binding, Verdict};
use tm_core::model::{EntityKind, MilestoneStatus, TreeKind};

pub(in crate::store) fn load_milestone(
    conn: &Connection,
    milestone_id: MilestoneId,
) -> Result<Option<MilestoneRow>, StoreError> {
    let raw = conn
        .query_row(
            "SELECT milestone_id, label, status FROM milestones WHERE milestone_id=?1",
            params![milestone_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;
    raw.map(|(milestone_id, label, status)| {
        Ok::<_, StoreError>(MilestoneRow {
            milestone_id,
            label,
            status: MilestoneStatus::parse(&status)?,
        })
    })
    .transpose()
}

pub(in crate::store) fn require_milestone(
    conn: &Connection,
    milestone_id: MilestoneId,
) -> Result<MilestoneRow, StoreError> {
    load_milestone(conn, milestone_id)?.ok_or(StoreError::not_found("milestone", milestone_id))
}

/// Every binding of the given entities, with the status of the bound milestone.
pub(in crate::store) fn bindings_of(
    conn: &Connection,
    entity_kind: EntityKind,
    entity_ids: &BTreeSet<i64>,
) -> Result<Vec<Binding>, StoreError> {
    let raws = select_rows_in(
        conn,
        r#"
        SELECT b.entity_id, b.milestone_id, m.status
        FROM milestone_bindings AS b
        JOIN milestones AS m ON m.milestone_id = b.milestone_id
        WHERE b.entity_kind = ? AND b.entity_id IN ({ids})
        "#,
        &[text(entity_kind.as_str())],
        entity_ids,
        |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        },
    )?;
    raws.into_iter()
        .map(|(entity_id, milestone_id, status)| {
            Ok::<_, StoreError>(Binding {
                entity_id,
                milestone_id,
                status: MilestoneStatus::parse(&status)?,
            })
        })
        .collect()
}

/// Versions per requirement; requirements without versions map to an empty set.
pub(in crate::store) fn requirement_versions_of(
    conn: &Connection,
    requirement_ids: &BTreeSet<NodeId>,
) -> Result<BTreeMap<NodeId, BTreeSet<RequirementVersionId>>, StoreError> {
    let mut out = requirement_ids
        .iter()
        .map(|id| (*id, BTreeSet::new()))
        .collect::<BTreeMap<_, _>>();
    let pairs = select_pairs_in(
        conn,
        "SELECT requirement_id, version_id FROM requirement_versions WHERE requirement_id IN ({ids})",
        &[],
        requirement_ids,
    )?;
    for (requirement_id, version_id) in pairs {
        out.entry(requirement_id).or_default().insert(version_id);
    }
    Ok(out)
}

/// Deletion verdict for leaves of `tree_kind`. Requirement leaves are judged
/// through their versions.
pub(in crate::store) fn leaf_deletion_verdict(
    conn: &Connection,
    tree_kind: TreeKind,
    leaf_ids: &BTreeSet<NodeId>,
) -> Result<Verdict, StoreError> {
    match tree_kind.leaf_entity() {
        EntityKind::RequirementVersion => {
            let owners = requirement_versions_of(conn, leaf_ids)?;
            let versions = owners
                .values()
                .flat_map(|versions| versions.iter().copied())
                .collect::<BTreeSet<_>>();
            let bindings = bindings_of(conn, EntityKind::RequirementVersion, &versions)?;
            let owned = milestones::deletable(&versions, &bindings);
            Ok(milestones::roll_up(&owners, &owned))
        }
        entity_kind => {
            let bindings = bindings_of(conn, entity_kind, leaf_ids)?;
            Ok(milestones::deletable(leaf_ids, &bindings))
        }
    }
}

/// Subset of `ids` naming existing entities of `entity_kind`.
pub(in crate::store) fn existing_entities(
    conn: &Connection,
    entity_kind: EntityKind,
    ids: &BTreeSet<i64>,
) -> Result<BTreeSet<i64>, StoreError> {
    match entity_kind {
        EntityKind::RequirementVersion => select_ids_in(
            conn,
            "SELECT version_id FROM requirement_versions WHERE version_id IN ({ids})",
            &[],
            ids,
        ),
        EntityKind::TestCase | EntityKind::Campaign => {
            let tree_kind = match entity_kind {
                EntityKind::Campaign => TreeKind::Campaign,
                _ => TreeKind::TestCase,
            };
            select_ids_in(
                conn,
                "SELECT node_id FROM nodes WHERE tree_kind=? AND kind='leaf' AND node_id IN ({ids})",
                &[text(tree_kind.as_str())],
                ids,
            )
        }
    }
}

pub(in crate::store) fn delete_bindings_tx(
    tx: &Transaction<'_>,
    entity_kind: EntityKind,
    entity_ids: &BTreeSet<i64>,
) -> Result<usize, StoreError> {
    execute_in(
        tx,
        "DELETE FROM milestone_bindings WHERE entity_kind=? AND entity_id IN ({ids})",
        &[text(entity_kind.as_str())],
        entity_ids,
    )
}

/// Entities of `entity_ids` already bound to `milestone_id`.
pub(in crate::store) fn bound_to(
    conn: &Connection,
    milestone_id: MilestoneId,
    entity_kind: EntityKind,
    entity_ids: &BTreeSet<i64>,
) -> Result<BTreeSet<i64>, StoreError> {
    select_ids_in(
        conn,
        "SELECT entity_id FROM milestone_bindings \
         WHERE milestone_id=? AND entity_kind=? AND entity_id IN ({ids})",
        &[Value::Integer(milestone_id), text(entity_kind.as_str())],
        entity_ids,
    )
}

/// One multi-row `INSERT` for the whole chunk.
pub(in crate::store) fn insert_bindings_tx(
    tx: &Transaction<'_>,
    milestone_id: MilestoneId,
    entity_kind: EntityKind,
    entity_ids: &[i64],
) -> Result<usize, StoreError> {
    if entity_ids.is_empty() {
        return Ok(0);
    }
    let values = (0..entity_ids.len())
        .map(|_| format!("({})", placeholders(3)))
        .collect::<Vec<_>>()
        .join(",");
    let sql =
        format!("INSERT INTO milestone_bindings(milestone_id, entity_kind, entity_id) VALUES {values}");
    let mut params = Vec::<Value>::with_capacity(entity_ids.len() * 3);
    for entity_id in entity_ids {
        params.push(Value::Integer(milestone_id));
        params.push(text(entity_kind.as_str()));
        params.push(Value::Integer(*entity_id));
    }
    Ok(tx.execute(&sql, params_from_iter(params))?)
}

pub(in crate::store) fn unbind_tx(
    tx: &Transaction<'_>,
    milestone_id: MilestoneId,
    entity_kind: EntityKind,
    entity_ids: &BTreeSet<i64>,
) -> Result<usize, StoreError> {
    execute_in(
        tx,
        "DELETE FROM milestone_bindings WHERE milestone_id=? AND entity_kind=? AND entity_id IN ({ids})",
        &[Value::Integer(milestone_id), text(entity_kind.as_str())],
        entity_ids,
    )
}

pub(in crate::store) fn milestones_of(
    conn: &Connection,
    entity_kind: EntityKind,
    entity_id: i64,
) -> Result<BTreeSet<MilestoneId>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT milestone_id FROM milestone_bindings WHERE entity_kind=?1 AND entity_id=?2",
    )?;
    let rows = stmt.query_map(params![entity_kind.as_str(), entity_id], |row| {
        row.get::<_, i64>(0)
    })?;
    Ok(rows.collect::<Result<BTreeSet<_>, _>>()?)
}
