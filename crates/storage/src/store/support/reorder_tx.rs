#![forbid(unsafe_code)]

//! Reorder engine: restores dense positions after items leave their scopes.
//!
//! Positions are unique per scope, so survivors are never shifted in place.
//! Every touched scope is fetched, wiped and re-inserted from the computed
//! order in one batched write.

use super::super::{ReorderReport, StoreError};
use super::ordered_tx::{
    delete_scopes_tx, insert_placements_tx, ordering_error, placements_by_scope,
};
use rusqlite::Transaction;
use std::collections::BTreeSet;
use tm_core::model::ScopeKind;
use tm_core::ordering::{self, Placement};

pub(in crate::store) fn reorder_after_removal_tx(
    tx: &Transaction<'_>,
    scope_kind: ScopeKind,
    scope_ids: &BTreeSet<i64>,
    items_to_remove: &BTreeSet<i64>,
) -> Result<ReorderReport, StoreError> {
    let mut report = ReorderReport::default();
    if scope_ids.is_empty() || items_to_remove.is_empty() {
        return Ok(report);
    }

    let current = placements_by_scope(tx, scope_kind, scope_ids)?;

    let mut touched = BTreeSet::new();
    let mut survivors = Vec::<(i64, Placement)>::new();
    for (scope_id, placements) in &current {
        let planned = ordering::compact(placements, items_to_remove)
            .map_err(|source| ordering_error(scope_kind, *scope_id, source))?;
        let removed = placements.len() - planned.len();
        if removed == 0 {
            continue;
        }
        touched.insert(*scope_id);
        report.items_removed += removed;
        report.items_reinserted += planned.len();
        survivors.extend(planned.into_iter().map(|placement| (*scope_id, placement)));
    }

    if touched.is_empty() {
        return Ok(report);
    }

    delete_scopes_tx(tx, scope_kind, &touched)?;
    insert_placements_tx(tx, scope_kind, &survivors)?;
    report.scopes_rewritten = touched.len();

    tracing::debug!(
        scope_kind = scope_kind.as_str(),
        scopes = report.scopes_rewritten,
        removed = report.items_removed,
        reinserted = report.items_reinserted,
        "reordered scopes"
    );
    Ok(report)
}
