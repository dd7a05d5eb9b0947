#![forbid(unsafe_code)]

use super::super::{IterationRow, IterationTestPlanItemRow, StoreError, TestSuiteRow};
use super::ordered_tx::delete_scopes_tx;
use super::sql::{execute_in, select_ids_in, select_pairs_in};
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::collections::BTreeSet;
use tm_core::ids::{IterationId, NodeId, TestPlanItemId, TestSuiteId};
use tm_core::model::ScopeKind;

pub(in crate::store) fn load_iteration(
    conn: &Connection,
    iteration_id: IterationId,
) -> Result<Option<IterationRow>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT iteration_id, campaign_id, name FROM iterations WHERE iteration_id=?1",
            params![iteration_id],
            |row| {
                Ok(IterationRow {
                    iteration_id: row.get(0)?,
                    campaign_id: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        )
        .optional()?)
}

pub(in crate::store) fn load_test_suite(
    conn: &Connection,
    suite_id: TestSuiteId,
) -> Result<Option<TestSuiteRow>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT suite_id, iteration_id, name FROM test_suites WHERE suite_id=?1",
            params![suite_id],
            |row| {
                Ok(TestSuiteRow {
                    suite_id: row.get(0)?,
                    iteration_id: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        )
        .optional()?)
}

pub(in crate::store) fn load_iteration_item(
    conn: &Connection,
    item_id: TestPlanItemId,
) -> Result<Option<IterationTestPlanItemRow>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT item_id, iteration_id, test_case_id, label \
             FROM iteration_test_plan_items WHERE item_id=?1",
            params![item_id],
            |row| {
                Ok(IterationTestPlanItemRow {
                    item_id: row.get(0)?,
                    iteration_id: row.get(1)?,
                    test_case_id: row.get(2)?,
                    label: row.get(3)?,
                })
            },
        )
        .optional()?)
}

pub(in crate::store) fn campaign_of_item(
    conn: &Connection,
    item_id: TestPlanItemId,
) -> Result<Option<NodeId>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT campaign_id FROM campaign_test_plan_items WHERE item_id=?1",
            params![item_id],
            |row| row.get(0),
        )
        .optional()?)
}

/// `(item_id, campaign_id)` of campaign test-plan items pointing at `test_case_ids`.
pub(in crate::store) fn campaign_items_referencing(
    conn: &Connection,
    test_case_ids: &BTreeSet<NodeId>,
) -> Result<Vec<(TestPlanItemId, NodeId)>, StoreError> {
    select_pairs_in(
        conn,
        "SELECT item_id, campaign_id FROM campaign_test_plan_items WHERE test_case_id IN ({ids})",
        &[],
        test_case_ids,
    )
}

/// `(item_id, iteration_id)` of iteration test-plan items pointing at `test_case_ids`.
pub(in crate::store) fn iteration_items_referencing(
    conn: &Connection,
    test_case_ids: &BTreeSet<NodeId>,
) -> Result<Vec<(TestPlanItemId, IterationId)>, StoreError> {
    select_pairs_in(
        conn,
        "SELECT item_id, iteration_id FROM iteration_test_plan_items WHERE test_case_id IN ({ids})",
        &[],
        test_case_ids,
    )
}

pub(in crate::store) fn items_with_executions(
    conn: &Connection,
    item_ids: &BTreeSet<TestPlanItemId>,
) -> Result<BTreeSet<TestPlanItemId>, StoreError> {
    select_ids_in(
        conn,
        "SELECT DISTINCT item_id FROM executions WHERE item_id IN ({ids})",
        &[],
        item_ids,
    )
}

/// Clears the test-case reference of items whose executions must survive.
pub(in crate::store) fn detach_test_case_tx(
    tx: &Transaction<'_>,
    item_ids: &BTreeSet<TestPlanItemId>,
) -> Result<usize, StoreError> {
    execute_in(
        tx,
        "UPDATE iteration_test_plan_items SET test_case_id = NULL WHERE item_id IN ({ids})",
        &[],
        item_ids,
    )
}

pub(in crate::store) fn delete_campaign_items_tx(
    tx: &Transaction<'_>,
    item_ids: &BTreeSet<TestPlanItemId>,
) -> Result<usize, StoreError> {
    execute_in(
        tx,
        "DELETE FROM campaign_test_plan_items WHERE item_id IN ({ids})",
        &[],
        item_ids,
    )
}

pub(in crate::store) fn delete_iteration_items_tx(
    tx: &Transaction<'_>,
    item_ids: &BTreeSet<TestPlanItemId>,
) -> Result<usize, StoreError> {
    execute_in(
        tx,
        "DELETE FROM executions WHERE item_id IN ({ids})",
        &[],
        item_ids,
    )?;
    execute_in(
        tx,
        "DELETE FROM iteration_test_plan_items WHERE item_id IN ({ids})",
        &[],
        item_ids,
    )
}

/// Removes everything a campaign owns: iterations, suites, both kinds of
/// test-plan items, executions and the ordering rows of each scope.
/// Returns the number of test-plan items removed.
pub(in crate::store) fn purge_campaigns_tx(
    tx: &Transaction<'_>,
    campaign_ids: &BTreeSet<NodeId>,
) -> Result<usize, StoreError> {
    if campaign_ids.is_empty() {
        return Ok(0);
    }
    let iterations = select_ids_in(
        tx,
        "SELECT iteration_id FROM iterations WHERE campaign_id IN ({ids})",
        &[],
        campaign_ids,
    )?;
    let suites = select_ids_in(
        tx,
        "SELECT suite_id FROM test_suites WHERE iteration_id IN ({ids})",
        &[],
        &iterations,
    )?;
    let iteration_items = select_ids_in(
        tx,
        "SELECT item_id FROM iteration_test_plan_items WHERE iteration_id IN ({ids})",
        &[],
        &iterations,
    )?;
    let campaign_items = select_ids_in(
        tx,
        "SELECT item_id FROM campaign_test_plan_items WHERE campaign_id IN ({ids})",
        &[],
        campaign_ids,
    )?;

    delete_scopes_tx(tx, ScopeKind::TestSuiteTestPlan, &suites)?;
    delete_scopes_tx(tx, ScopeKind::IterationTestPlan, &iterations)?;
    delete_scopes_tx(tx, ScopeKind::CampaignTestPlan, campaign_ids)?;

    let mut removed = delete_iteration_items_tx(tx, &iteration_items)?;
    removed += delete_campaign_items_tx(tx, &campaign_items)?;
    execute_in(
        tx,
        "DELETE FROM test_suites WHERE suite_id IN ({ids})",
        &[],
        &suites,
    )?;
    execute_in(
        tx,
        "DELETE FROM iterations WHERE iteration_id IN ({ids})",
        &[],
        &iterations,
    )?;

    tracing::debug!(
        campaigns = campaign_ids.len(),
        iterations = iterations.len(),
        suites = suites.len(),
        items = removed,
        "purged campaign contents"
    );
    Ok(removed)
}
