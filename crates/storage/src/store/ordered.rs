#![forbid(unsafe_code)]

use super::support::*;
use super::{ReorderReport, SqliteStore, StoreError, UnitOfWork};
use rusqlite::Connection;
use std::collections::BTreeSet;
use tm_core::model::{Scope, ScopeKind};
use tm_core::ordering::Placement;

fn ensure_not_content(scope: Scope) -> Result<(), StoreError> {
    match scope.kind {
        ScopeKind::LibraryContent | ScopeKind::FolderContent => Err(StoreError::InvalidInput(
            "container content follows node insert, move and delete",
        )),
        _ => Ok(()),
    }
}

/// Test-plan items only join the plans of their own campaign or iteration.
fn ensure_member_of(conn: &Connection, scope: Scope, item_id: i64) -> Result<(), StoreError> {
    let belongs = match scope.kind {
        ScopeKind::LibraryContent | ScopeKind::FolderContent => {
            return ensure_not_content(scope);
        }
        ScopeKind::CampaignTestPlan => {
            campaign_of_item(conn, item_id)?.map(|campaign_id| campaign_id == scope.id)
        }
        ScopeKind::IterationTestPlan => {
            load_iteration_item(conn, item_id)?.map(|item| item.iteration_id == scope.id)
        }
        ScopeKind::TestSuiteTestPlan => {
            let suite = load_test_suite(conn, scope.id)?
                .ok_or(StoreError::not_found("test suite", scope.id))?;
            load_iteration_item(conn, item_id)?.map(|item| item.iteration_id == suite.iteration_id)
        }
    };
    match belongs {
        Some(true) => Ok(()),
        Some(false) => Err(StoreError::InvalidInput(
            "item belongs to another test plan",
        )),
        None => Err(StoreError::not_found("test-plan item", item_id)),
    }
}

impl UnitOfWork<'_> {
    /// Appends `item_id` to a test-plan scope and returns its position.
    pub fn append(&mut self, scope: Scope, item_id: i64) -> Result<i64, StoreError> {
        ensure_member_of(&self.tx, scope, item_id)?;
        append_tx(&self.tx, scope, item_id)
    }

    /// Drops `item_ids` from `scope`; survivors keep their relative order at
    /// positions `0..n-1`.
    ///
    /// Leaving a campaign or iteration test plan deletes the item itself; an
    /// iteration item also leaves its suites and takes its executions along.
    /// Leaving a suite only drops the suite ordering.
    pub fn remove_and_compact(
        &mut self,
        scope: Scope,
        item_ids: &BTreeSet<i64>,
    ) -> Result<ReorderReport, StoreError> {
        ensure_not_content(scope)?;
        let removed = scope_placements(&self.tx, scope)?
            .into_iter()
            .map(|placement| placement.item_id)
            .filter(|item_id| item_ids.contains(item_id))
            .collect::<BTreeSet<_>>();

        let mut report =
            reorder_after_removal_tx(&self.tx, scope.kind, &BTreeSet::from([scope.id]), &removed)?;
        match scope.kind {
            ScopeKind::CampaignTestPlan => {
                delete_campaign_items_tx(&self.tx, &removed)?;
            }
            ScopeKind::IterationTestPlan => {
                let suites = scopes_containing(&self.tx, ScopeKind::TestSuiteTestPlan, &removed)?;
                report.absorb(reorder_after_removal_tx(
                    &self.tx,
                    ScopeKind::TestSuiteTestPlan,
                    &suites,
                    &removed,
                )?);
                delete_iteration_items_tx(&self.tx, &removed)?;
            }
            _ => {}
        }
        Ok(report)
    }

    pub fn move_item(
        &mut self,
        scope: Scope,
        item_id: i64,
        new_position: i64,
    ) -> Result<Vec<Placement>, StoreError> {
        ensure_not_content(scope)?;
        move_item_tx(&self.tx, scope, item_id, new_position)
    }
}

impl SqliteStore {
    /// Items of `scope` ordered by position.
    pub fn list_scope(&self, scope: Scope) -> Result<Vec<Placement>, StoreError> {
        scope_placements(&self.conn, scope)
    }

    pub fn remove_and_compact(
        &mut self,
        scope: Scope,
        item_ids: &BTreeSet<i64>,
    ) -> Result<ReorderReport, StoreError> {
        self.write(|work| work.remove_and_compact(scope, item_ids))
    }
}
