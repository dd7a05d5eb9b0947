#![forbid(unsafe_code)]

use super::super::StoreError;
use super::super::support::*;
use super::DeletionCascade;
use rusqlite::params;
use serde_json::json;
use std::collections::BTreeSet;
use tm_core::ids::NodeId;
use tm_core::model::{EntityKind, ScopeKind, TreeKind};

impl DeletionCascade<'_, '_> {
    /// One reorder pass per ordered-list kind, across all of its scopes.
    pub(super) fn reorder_scopes(&mut self) -> Result<(), StoreError> {
        for (scope_kind, scope_ids, item_ids) in self.removals.iter() {
            let report = reorder_after_removal_tx(self.tx, scope_kind, scope_ids, item_ids)?;
            self.reorder.absorb(report);
        }
        Ok(())
    }

    pub(super) fn purge(&mut self) -> Result<(), StoreError> {
        detach_test_case_tx(self.tx, &self.result.detached_test_plan_items)?;
        delete_campaign_items_tx(self.tx, &self.campaign_items)?;
        delete_iteration_items_tx(self.tx, &self.iteration_items)?;

        let leaves = self.doomed_leaves();
        match self.tree_kind {
            TreeKind::TestCase => {
                delete_bindings_tx(self.tx, EntityKind::TestCase, &leaves)?;
            }
            TreeKind::Requirement => {
                let versions = requirement_versions_of(self.tx, &leaves)?
                    .into_values()
                    .flatten()
                    .collect::<BTreeSet<_>>();
                delete_bindings_tx(self.tx, EntityKind::RequirementVersion, &versions)?;
                execute_in(
                    self.tx,
                    "DELETE FROM requirement_versions WHERE requirement_id IN ({ids})",
                    &[],
                    &leaves,
                )?;
            }
            TreeKind::Campaign => {
                purge_campaigns_tx(self.tx, &leaves)?;
                delete_bindings_tx(self.tx, EntityKind::Campaign, &leaves)?;
            }
        }

        // Children before parents.
        let depths = depths_of(self.tx, self.tree_kind, &self.doomed)?;
        let mut order = self
            .doomed
            .iter()
            .map(|node_id| (depths.get(node_id).copied().unwrap_or_default(), *node_id))
            .collect::<Vec<_>>();
        order.sort_unstable_by(|left, right| right.cmp(left));

        for (_, node_id) in order {
            self.purge_node(node_id)?;
            self.result.deleted.insert(node_id);
        }
        Ok(())
    }

    fn purge_node(&self, node_id: NodeId) -> Result<(), StoreError> {
        closure_on_node_deleted_tx(self.tx, self.tree_kind, node_id)?;
        if let Some(node) = self.nodes.get(&node_id) {
            if node.is_folder() {
                delete_scopes_tx(self.tx, ScopeKind::FolderContent, &BTreeSet::from([node_id]))?;
            }
            let container = node.parent_ref().content_scope();
            delete_memberships_tx(self.tx, container.kind, &BTreeSet::from([node_id]))?;
        }
        self.tx.execute(
            "DELETE FROM nodes WHERE node_id=?1 AND tree_kind=?2",
            params![node_id, self.tree_kind.as_str()],
        )?;
        Ok(())
    }

    pub(super) fn finish(&mut self) -> Result<(), StoreError> {
        if self.result.is_noop() {
            tracing::debug!(
                tree_kind = self.tree_kind.as_str(),
                not_found = self.result.not_found.len(),
                skipped = self.result.skipped_milestone_locked.len(),
                "nothing deleted"
            );
            return Ok(());
        }

        let payload = json!({
            "tree_kind": self.tree_kind.as_str(),
            "deleted": self.result.deleted,
            "skipped_milestone_locked": self.result.skipped_milestone_locked,
            "retained_ancestors": self.result.retained_ancestors,
            "detached_test_plan_items": self.result.detached_test_plan_items,
            "scopes_rewritten": self.reorder.scopes_rewritten,
        });
        insert_event_tx(self.tx, now_ms(), "nodes_deleted", &payload)?;

        tracing::info!(
            tree_kind = self.tree_kind.as_str(),
            deleted = self.result.deleted.len(),
            skipped = self.result.skipped_milestone_locked.len(),
            detached = self.result.detached_test_plan_items.len(),
            scopes_rewritten = self.reorder.scopes_rewritten,
            items_reinserted = self.reorder.items_reinserted,
            "deleted nodes"
        );
        Ok(())
    }
}
