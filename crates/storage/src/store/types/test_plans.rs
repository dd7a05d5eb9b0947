#![forbid(unsafe_code)]

use tm_core::ids::{IterationId, NodeId, TestPlanItemId, TestSuiteId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignTestPlanItemRow {
    pub item_id: TestPlanItemId,
    pub campaign_id: NodeId,
    pub test_case_id: NodeId,
    pub position: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IterationRow {
    pub iteration_id: IterationId,
    pub campaign_id: NodeId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestSuiteRow {
    pub suite_id: TestSuiteId,
    pub iteration_id: IterationId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IterationTestPlanItemRow {
    pub item_id: TestPlanItemId,
    pub iteration_id: IterationId,
    /// `None` once the referenced test case has been deleted.
    pub test_case_id: Option<NodeId>,
    pub label: String,
}

/// Outcome of one reorder pass over a single ordered-list kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReorderReport {
    pub scopes_rewritten: usize,
    pub items_removed: usize,
    pub items_reinserted: usize,
}

impl ReorderReport {
    pub fn absorb(&mut self, other: ReorderReport) {
        self.scopes_rewritten += other.scopes_rewritten;
        self.items_removed += other.items_removed;
        self.items_reinserted += other.items_reinserted;
    }
}
