#![forbid(unsafe_code)]

//! Batch deletion of tree nodes.
//!
//! A batch walks `Requested -> MilestoneFiltered -> ScopesResolved ->
//! Reordered -> Purged -> Done` inside the caller's transaction. Any error
//! leaves the transaction to be rolled back; nothing is partially applied.

mod purge;
mod resolve;

use super::{DeletionResult, NodeRow, ReorderReport, SqliteStore, StoreError, UnitOfWork};
use rusqlite::Transaction;
use std::collections::{BTreeMap, BTreeSet};
use tm_core::ids::{NodeId, TestPlanItemId};
use tm_core::model::TreeKind;

use resolve::ScopeRemovals;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CascadeState {
    Requested,
    MilestoneFiltered,
    ScopesResolved,
    Reordered,
    Purged,
    Done,
}

pub(super) struct DeletionCascade<'t, 'c> {
    tx: &'t Transaction<'c>,
    tree_kind: TreeKind,
    state: CascadeState,
    requested: BTreeSet<NodeId>,
    /// Nodes of the expanded batch, keyed by id.
    nodes: BTreeMap<NodeId, NodeRow>,
    /// Nodes that will actually be purged.
    doomed: BTreeSet<NodeId>,
    removals: ScopeRemovals,
    campaign_items: BTreeSet<TestPlanItemId>,
    iteration_items: BTreeSet<TestPlanItemId>,
    reorder: ReorderReport,
    result: DeletionResult,
}

impl<'t, 'c> DeletionCascade<'t, 'c> {
    pub(super) fn new(
        tx: &'t Transaction<'c>,
        tree_kind: TreeKind,
        requested: BTreeSet<NodeId>,
    ) -> Self {
        Self {
            tx,
            tree_kind,
            state: CascadeState::Requested,
            requested,
            nodes: BTreeMap::new(),
            doomed: BTreeSet::new(),
            removals: ScopeRemovals::default(),
            campaign_items: BTreeSet::new(),
            iteration_items: BTreeSet::new(),
            reorder: ReorderReport::default(),
            result: DeletionResult::default(),
        }
    }

    pub(super) fn run(mut self) -> Result<DeletionResult, StoreError> {
        loop {
            let next = match self.state {
                CascadeState::Requested => {
                    self.filter_milestones()?;
                    CascadeState::MilestoneFiltered
                }
                CascadeState::MilestoneFiltered => {
                    self.resolve_scopes()?;
                    CascadeState::ScopesResolved
                }
                CascadeState::ScopesResolved => {
                    self.reorder_scopes()?;
                    CascadeState::Reordered
                }
                CascadeState::Reordered => {
                    self.purge()?;
                    CascadeState::Purged
                }
                CascadeState::Purged => {
                    self.finish()?;
                    CascadeState::Done
                }
                CascadeState::Done => return Ok(self.result),
            };
            tracing::trace!(from = ?self.state, to = ?next, "deletion cascade");
            self.state = next;
        }
    }
}

impl UnitOfWork<'_> {
    /// Deletes `node_ids` together with their subtrees.
    ///
    /// Leaves bound to a PLANNED or LOCKED milestone survive, and so do the
    /// folders above them; both are reported in the result rather than
    /// raised. Ids that do not exist are reported in `not_found`.
    pub fn delete_nodes(
        &mut self,
        tree_kind: TreeKind,
        node_ids: &BTreeSet<NodeId>,
    ) -> Result<DeletionResult, StoreError> {
        DeletionCascade::new(&self.tx, tree_kind, node_ids.clone()).run()
    }
}

impl SqliteStore {
    pub fn delete_nodes(
        &mut self,
        tree_kind: TreeKind,
        node_ids: &BTreeSet<NodeId>,
    ) -> Result<DeletionResult, StoreError> {
        self.write(|work| work.delete_nodes(tree_kind, node_ids))
    }
}
