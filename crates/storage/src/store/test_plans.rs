#![forbid(unsafe_code)]

use super::support::*;
use super::{
    CampaignTestPlanItemRow, IterationRow, IterationTestPlanItemRow, SqliteStore, StoreError,
    TestSuiteRow, UnitOfWork,
};
use rusqlite::params;
use tm_core::ids::{ExecutionId, IterationId, NodeId, TestPlanItemId, TestSuiteId};
use tm_core::model::{Scope, ScopeKind, TreeKind};

impl UnitOfWork<'_> {
    /// Plans `test_case_id` at the end of the campaign's test plan.
    pub fn add_campaign_test_plan_item(
        &mut self,
        campaign_id: NodeId,
        test_case_id: NodeId,
    ) -> Result<CampaignTestPlanItemRow, StoreError> {
        require_leaf(&self.tx, TreeKind::Campaign, campaign_id, "campaign")?;
        require_leaf(&self.tx, TreeKind::TestCase, test_case_id, "test case")?;
        self.tx.execute(
            "INSERT INTO campaign_test_plan_items(campaign_id, test_case_id) VALUES (?1, ?2)",
            params![campaign_id, test_case_id],
        )?;
        let item_id = self.tx.last_insert_rowid();
        let position = append_tx(
            &self.tx,
            Scope::new(ScopeKind::CampaignTestPlan, campaign_id),
            item_id,
        )?;
        Ok(CampaignTestPlanItemRow {
            item_id,
            campaign_id,
            test_case_id,
            position,
        })
    }

    pub fn add_iteration(
        &mut self,
        campaign_id: NodeId,
        name: &str,
    ) -> Result<IterationRow, StoreError> {
        require_leaf(&self.tx, TreeKind::Campaign, campaign_id, "campaign")?;
        let name = validate_name(name)?;
        self.tx.execute(
            "INSERT INTO iterations(campaign_id, name) VALUES (?1, ?2)",
            params![campaign_id, name],
        )?;
        Ok(IterationRow {
            iteration_id: self.tx.last_insert_rowid(),
            campaign_id,
            name,
        })
    }

    pub fn add_test_suite(
        &mut self,
        iteration_id: IterationId,
        name: &str,
    ) -> Result<TestSuiteRow, StoreError> {
        if load_iteration(&self.tx, iteration_id)?.is_none() {
            return Err(StoreError::not_found("iteration", iteration_id));
        }
        let name = validate_name(name)?;
        self.tx.execute(
            "INSERT INTO test_suites(iteration_id, name) VALUES (?1, ?2)",
            params![iteration_id, name],
        )?;
        Ok(TestSuiteRow {
            suite_id: self.tx.last_insert_rowid(),
            iteration_id,
            name,
        })
    }

    /// Plans `test_case_id` at the end of the iteration's test plan.
    pub fn add_iteration_test_plan_item(
        &mut self,
        iteration_id: IterationId,
        test_case_id: NodeId,
        label: &str,
    ) -> Result<IterationTestPlanItemRow, StoreError> {
        if load_iteration(&self.tx, iteration_id)?.is_none() {
            return Err(StoreError::not_found("iteration", iteration_id));
        }
        require_leaf(&self.tx, TreeKind::TestCase, test_case_id, "test case")?;
        let label = validate_name(label)?;
        self.tx.execute(
            "INSERT INTO iteration_test_plan_items(iteration_id, test_case_id, label) \
             VALUES (?1, ?2, ?3)",
            params![iteration_id, test_case_id, label],
        )?;
        let item_id = self.tx.last_insert_rowid();
        append_tx(
            &self.tx,
            Scope::new(ScopeKind::IterationTestPlan, iteration_id),
            item_id,
        )?;
        Ok(IterationTestPlanItemRow {
            item_id,
            iteration_id,
            test_case_id: Some(test_case_id),
            label,
        })
    }

    /// Adds an iteration item to a suite of the same iteration; returns its
    /// position in the suite.
    pub fn bind_item_to_suite(
        &mut self,
        suite_id: TestSuiteId,
        item_id: TestPlanItemId,
    ) -> Result<i64, StoreError> {
        let suite = load_test_suite(&self.tx, suite_id)?
            .ok_or(StoreError::not_found("test suite", suite_id))?;
        let item = load_iteration_item(&self.tx, item_id)?
            .ok_or(StoreError::not_found("iteration test-plan item", item_id))?;
        if item.iteration_id != suite.iteration_id {
            return Err(StoreError::InvalidInput(
                "item and suite belong to different iterations",
            ));
        }
        append_tx(
            &self.tx,
            Scope::new(ScopeKind::TestSuiteTestPlan, suite_id),
            item_id,
        )
    }

    pub fn record_execution(
        &mut self,
        item_id: TestPlanItemId,
        status: &str,
    ) -> Result<ExecutionId, StoreError> {
        if load_iteration_item(&self.tx, item_id)?.is_none() {
            return Err(StoreError::not_found("iteration test-plan item", item_id));
        }
        let status = status.trim();
        if status.is_empty() {
            return Err(StoreError::InvalidInput("execution status must not be empty"));
        }
        self.tx.execute(
            "INSERT INTO executions(item_id, status, executed_at_ms) VALUES (?1, ?2, ?3)",
            params![item_id, status, now_ms()],
        )?;
        Ok(self.tx.last_insert_rowid())
    }
}

impl SqliteStore {
    pub fn get_iteration_test_plan_item(
        &self,
        item_id: TestPlanItemId,
    ) -> Result<Option<IterationTestPlanItemRow>, StoreError> {
        load_iteration_item(&self.conn, item_id)
    }

    /// The campaign's test plan in position order.
    pub fn campaign_test_plan(
        &self,
        campaign_id: NodeId,
    ) -> Result<Vec<CampaignTestPlanItemRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT i.item_id, i.campaign_id, i.test_case_id, o.position
            FROM campaign_test_plan_items AS i
            JOIN ordered_items AS o
              ON o.scope_kind = ?1 AND o.scope_id = i.campaign_id AND o.item_id = i.item_id
            WHERE i.campaign_id = ?2
            ORDER BY o.position ASC
            "#,
        )?;
        let rows = stmt.query_map(
            params![ScopeKind::CampaignTestPlan.as_str(), campaign_id],
            |row| {
                Ok(CampaignTestPlanItemRow {
                    item_id: row.get(0)?,
                    campaign_id: row.get(1)?,
                    test_case_id: row.get(2)?,
                    position: row.get(3)?,
                })
            },
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn execution_count(&self, item_id: TestPlanItemId) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM executions WHERE item_id=?1",
            params![item_id],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
