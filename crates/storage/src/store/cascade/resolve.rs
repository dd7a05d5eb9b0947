#![forbid(unsafe_code)]

use super::super::StoreError;
use super::super::support::*;
use super::DeletionCascade;
use std::collections::{BTreeMap, BTreeSet};
use tm_core::ids::NodeId;
use tm_core::model::{NodeKind, Scope, ScopeKind, TreeKind};

/// Items leaving ordered collections, grouped per kind so that each kind is
/// reordered in one batch.
#[derive(Debug, Default)]
pub(super) struct ScopeRemovals {
    by_kind: BTreeMap<ScopeKind, (BTreeSet<i64>, BTreeSet<i64>)>,
}

impl ScopeRemovals {
    fn add(&mut self, scope: Scope, item_id: i64) {
        let (scope_ids, item_ids) = self.by_kind.entry(scope.kind).or_default();
        scope_ids.insert(scope.id);
        item_ids.insert(item_id);
    }

    fn add_many(&mut self, kind: ScopeKind, scopes: &BTreeSet<i64>, items: &BTreeSet<i64>) {
        if scopes.is_empty() || items.is_empty() {
            return;
        }
        let (scope_ids, item_ids) = self.by_kind.entry(kind).or_default();
        scope_ids.extend(scopes);
        item_ids.extend(items);
    }

    /// `(kind, scope ids, item ids)` per affected kind.
    pub(super) fn iter(
        &self,
    ) -> impl Iterator<Item = (ScopeKind, &BTreeSet<i64>, &BTreeSet<i64>)> {
        self.by_kind
            .iter()
            .map(|(kind, (scope_ids, item_ids))| (*kind, scope_ids, item_ids))
    }

    fn scope_count(&self) -> usize {
        self.by_kind.values().map(|(scope_ids, _)| scope_ids.len()).sum()
    }
}

impl DeletionCascade<'_, '_> {
    pub(super) fn doomed_leaves(&self) -> BTreeSet<NodeId> {
        self.doomed
            .iter()
            .filter(|node_id| {
                self.nodes
                    .get(*node_id)
                    .is_some_and(|node| node.kind == NodeKind::Leaf)
            })
            .copied()
            .collect()
    }

    /// Expands the request to whole subtrees and holds back milestone-locked
    /// leaves together with every folder above them.
    pub(super) fn filter_milestones(&mut self) -> Result<(), StoreError> {
        let mut nodes = load_nodes(self.tx, self.tree_kind, &self.requested)?;
        self.result.not_found = self
            .requested
            .iter()
            .filter(|node_id| !nodes.contains_key(*node_id))
            .copied()
            .collect();

        let roots = nodes.keys().copied().collect::<BTreeSet<_>>();
        let below = descendants_of(self.tx, self.tree_kind, &roots)?
            .difference(&roots)
            .copied()
            .collect::<BTreeSet<_>>();
        nodes.extend(load_nodes(self.tx, self.tree_kind, &below)?);

        let leaves = nodes
            .values()
            .filter(|node| node.kind == NodeKind::Leaf)
            .map(|node| node.node_id)
            .collect::<BTreeSet<_>>();
        let verdict = leaf_deletion_verdict(self.tx, self.tree_kind, &leaves)?;

        let expanded = nodes.keys().copied().collect::<BTreeSet<_>>();
        let retained = proper_ancestors_of_any(self.tx, self.tree_kind, &verdict.forbidden)?
            .intersection(&expanded)
            .copied()
            .collect::<BTreeSet<_>>();
        self.doomed = expanded
            .iter()
            .filter(|node_id| {
                !verdict.forbidden.contains(*node_id) && !retained.contains(*node_id)
            })
            .copied()
            .collect();

        if !verdict.forbidden.is_empty() {
            tracing::warn!(
                tree_kind = self.tree_kind.as_str(),
                skipped = verdict.forbidden.len(),
                retained = retained.len(),
                "milestone-locked leaves kept"
            );
        }
        tracing::debug!(
            tree_kind = self.tree_kind.as_str(),
            requested = self.requested.len(),
            expanded = expanded.len(),
            doomed = self.doomed.len(),
            "milestone filter applied"
        );

        self.nodes = nodes;
        self.result.skipped_milestone_locked = verdict.forbidden;
        self.result.retained_ancestors = retained;
        Ok(())
    }

    /// Collects every ordered collection that loses members.
    pub(super) fn resolve_scopes(&mut self) -> Result<(), StoreError> {
        for node_id in &self.doomed {
            let Some(node) = self.nodes.get(node_id) else {
                continue;
            };
            // A doomed folder's content scope disappears with it.
            if node
                .parent_id
                .is_some_and(|parent_id| self.doomed.contains(&parent_id))
            {
                continue;
            }
            self.removals.add(node.parent_ref().content_scope(), *node_id);
        }

        if self.tree_kind == TreeKind::TestCase {
            let test_cases = self.doomed_leaves();
            self.resolve_test_plan_items(&test_cases)?;
        }

        tracing::debug!(
            tree_kind = self.tree_kind.as_str(),
            scopes = self.removals.scope_count(),
            detached = self.result.detached_test_plan_items.len(),
            "scopes resolved"
        );
        Ok(())
    }

    /// Campaign items always go. Iteration items go too unless they carry
    /// executions, in which case they stay in place without a test case.
    fn resolve_test_plan_items(
        &mut self,
        test_cases: &BTreeSet<NodeId>,
    ) -> Result<(), StoreError> {
        for (item_id, campaign_id) in campaign_items_referencing(self.tx, test_cases)? {
            self.removals
                .add(Scope::new(ScopeKind::CampaignTestPlan, campaign_id), item_id);
            self.campaign_items.insert(item_id);
        }

        let iteration_refs = iteration_items_referencing(self.tx, test_cases)?;
        let referencing = iteration_refs
            .iter()
            .map(|(item_id, _)| *item_id)
            .collect::<BTreeSet<_>>();
        let with_history = items_with_executions(self.tx, &referencing)?;

        let mut removable = BTreeSet::new();
        for (item_id, iteration_id) in iteration_refs {
            if with_history.contains(&item_id) {
                self.result.detached_test_plan_items.insert(item_id);
                continue;
            }
            self.removals
                .add(Scope::new(ScopeKind::IterationTestPlan, iteration_id), item_id);
            removable.insert(item_id);
        }

        let suites = scopes_containing(self.tx, ScopeKind::TestSuiteTestPlan, &removable)?;
        self.removals
            .add_many(ScopeKind::TestSuiteTestPlan, &suites, &removable);
        self.iteration_items = removable;
        Ok(())
    }
}
