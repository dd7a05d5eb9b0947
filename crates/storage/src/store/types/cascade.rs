#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use tm_core::ids::{NodeId, TestPlanItemId};

/// What a deletion batch did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeletionResult {
    /// Nodes removed, including descendants of the requested ids.
    pub deleted: BTreeSet<NodeId>,
    /// Leaves bound to a PLANNED or LOCKED milestone.
    pub skipped_milestone_locked: BTreeSet<NodeId>,
    /// Folders kept because a locked leaf still lives below them.
    pub retained_ancestors: BTreeSet<NodeId>,
    /// Requested ids that did not exist in the tree.
    pub not_found: BTreeSet<NodeId>,
    /// Iteration test-plan items kept for their execution history, with their
    /// test-case reference cleared.
    pub detached_test_plan_items: BTreeSet<TestPlanItemId>,
}

impl DeletionResult {
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.detached_test_plan_items.is_empty()
    }
}
