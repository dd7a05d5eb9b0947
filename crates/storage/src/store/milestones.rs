#![forbid(unsafe_code)]

use super::support::*;
use super::{BindResult, MilestoneRow, SqliteStore, StoreError, UnbindResult, UnitOfWork};
use rusqlite::params;
use std::collections::BTreeSet;
use tm_core::ids::{MilestoneId, NodeId};
use tm_core::milestones::{self, Verdict};
use tm_core::model::{EntityKind, MilestoneStatus, TreeKind};

impl UnitOfWork<'_> {
    pub fn create_milestone(
        &mut self,
        label: &str,
        status: MilestoneStatus,
    ) -> Result<MilestoneRow, StoreError> {
        let label = validate_name(label)?;
        let taken = self
            .tx
            .query_row(
                "SELECT COUNT(1) FROM milestones WHERE label=?1",
                params![label],
                |row| row.get::<_, i64>(0),
            )?
            > 0;
        if taken {
            return Err(StoreError::DuplicateName { name: label });
        }
        self.tx.execute(
            "INSERT INTO milestones(label, status) VALUES (?1, ?2)",
            params![label, status.as_str()],
        )?;
        Ok(MilestoneRow {
            milestone_id: self.tx.last_insert_rowid(),
            label,
            status,
        })
    }

    pub fn set_milestone_status(
        &mut self,
        milestone_id: MilestoneId,
        status: MilestoneStatus,
    ) -> Result<MilestoneRow, StoreError> {
        let mut milestone = require_milestone(&self.tx, milestone_id)?;
        self.tx.execute(
            "UPDATE milestones SET status=?2 WHERE milestone_id=?1",
            params![milestone_id, status.as_str()],
        )?;
        milestone.status = status;
        Ok(milestone)
    }

    /// Binds existing entities to a milestone, `batch_size` entities per
    /// write. Fails with `MilestoneLocked` when the milestone is LOCKED.
    pub fn bind_to_milestone(
        &mut self,
        milestone_id: MilestoneId,
        entity_kind: EntityKind,
        entity_ids: &BTreeSet<i64>,
    ) -> Result<BindResult, StoreError> {
        let milestone = require_milestone(&self.tx, milestone_id)?;
        if !milestone.status.accepts_bindings() {
            return Err(StoreError::MilestoneLocked { milestone_id });
        }

        let existing = existing_entities(&self.tx, entity_kind, entity_ids)?;
        let mut result = BindResult {
            unknown: entity_ids.difference(&existing).copied().collect(),
            ..BindResult::default()
        };

        let candidates = existing.into_iter().collect::<Vec<_>>();
        for chunk in candidates.chunks(self.config.batch_size) {
            let chunk_ids = chunk.iter().copied().collect::<BTreeSet<_>>();
            let present = bound_to(&self.tx, milestone_id, entity_kind, &chunk_ids)?;
            let fresh = chunk_ids.difference(&present).copied().collect::<Vec<_>>();
            insert_bindings_tx(&self.tx, milestone_id, entity_kind, &fresh)?;
            tracing::debug!(
                milestone_id,
                entity_kind = entity_kind.as_str(),
                bound = fresh.len(),
                already_bound = present.len(),
                "milestone bind batch"
            );
            result.bound.extend(fresh);
            result.already_bound.extend(present);
        }
        Ok(result)
    }

    /// Unbinds the eligible entities, `batch_size` entities per write.
    /// Entities that are not eligible are reported in `rejected`.
    pub fn unbind_from_milestone(
        &mut self,
        milestone_id: MilestoneId,
        entity_kind: EntityKind,
        entity_ids: &BTreeSet<i64>,
    ) -> Result<UnbindResult, StoreError> {
        require_milestone(&self.tx, milestone_id)?;

        let mut result = UnbindResult::default();
        let candidates = entity_ids.iter().copied().collect::<Vec<_>>();
        for chunk in candidates.chunks(self.config.batch_size) {
            let chunk_ids = chunk.iter().copied().collect::<BTreeSet<_>>();
            let bindings = bindings_of(&self.tx, entity_kind, &chunk_ids)?;
            let verdict = milestones::unbindable(&chunk_ids, milestone_id, &bindings);
            unbind_tx(&self.tx, milestone_id, entity_kind, &verdict.allowed)?;
            tracing::debug!(
                milestone_id,
                entity_kind = entity_kind.as_str(),
                unbound = verdict.allowed.len(),
                rejected = verdict.forbidden.len(),
                "milestone unbind batch"
            );
            result.unbound.extend(verdict.allowed);
            result.rejected.extend(verdict.forbidden);
        }
        if !result.rejected.is_empty() {
            tracing::warn!(
                milestone_id,
                rejected = result.rejected.len(),
                "entities kept on milestone"
            );
        }
        Ok(result)
    }
}

impl SqliteStore {
    pub fn get_milestone(
        &self,
        milestone_id: MilestoneId,
    ) -> Result<Option<MilestoneRow>, StoreError> {
        load_milestone(&self.conn, milestone_id)
    }

    pub fn milestones_of(
        &self,
        entity_kind: EntityKind,
        entity_id: i64,
    ) -> Result<BTreeSet<MilestoneId>, StoreError> {
        milestones_of(&self.conn, entity_kind, entity_id)
    }

    /// Splits `entity_ids` by whether a milestone forbids their deletion.
    pub fn deletable_ids(
        &self,
        entity_kind: EntityKind,
        entity_ids: &BTreeSet<i64>,
    ) -> Result<Verdict, StoreError> {
        let bindings = bindings_of(&self.conn, entity_kind, entity_ids)?;
        Ok(milestones::deletable(entity_ids, &bindings))
    }

    /// Deletion verdict for leaf nodes; requirements are judged by their
    /// versions.
    pub fn deletable_leaves(
        &self,
        tree_kind: TreeKind,
        leaf_ids: &BTreeSet<NodeId>,
    ) -> Result<Verdict, StoreError> {
        leaf_deletion_verdict(&self.conn, tree_kind, leaf_ids)
    }

    pub fn unbindable_ids(
        &self,
        milestone_id: MilestoneId,
        entity_kind: EntityKind,
        entity_ids: &BTreeSet<i64>,
    ) -> Result<Verdict, StoreError> {
        let bindings = bindings_of(&self.conn, entity_kind, entity_ids)?;
        Ok(milestones::unbindable(entity_ids, milestone_id, &bindings))
    }
}
