#![forbid(unsafe_code)]

use super::support::*;
use super::{SqliteStore, StoreError, UnitOfWork};
use rusqlite::params;
use std::collections::BTreeSet;
use tm_core::ids::{NodeId, RequirementVersionId};
use tm_core::model::TreeKind;

impl UnitOfWork<'_> {
    /// Adds the next version of a requirement leaf.
    pub fn add_requirement_version(
        &mut self,
        requirement_id: NodeId,
    ) -> Result<RequirementVersionId, StoreError> {
        require_leaf(&self.tx, TreeKind::Requirement, requirement_id, "requirement")?;
        let current: Option<i64> = self.tx.query_row(
            "SELECT MAX(version_number) FROM requirement_versions WHERE requirement_id=?1",
            params![requirement_id],
            |row| row.get(0),
        )?;
        self.tx.execute(
            "INSERT INTO requirement_versions(requirement_id, version_number) VALUES (?1, ?2)",
            params![requirement_id, current.unwrap_or(0) + 1],
        )?;
        Ok(self.tx.last_insert_rowid())
    }
}

impl SqliteStore {
    pub fn requirement_versions(
        &self,
        requirement_id: NodeId,
    ) -> Result<BTreeSet<RequirementVersionId>, StoreError> {
        let mut versions = requirement_versions_of(
            &self.conn,
            &BTreeSet::from([requirement_id]),
        )?;
        Ok(versions.remove(&requirement_id).unwrap_or_default())
    }
}
