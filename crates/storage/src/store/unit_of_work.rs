#![forbid(unsafe_code)]

use super::{StoreConfig, StoreError};
use rusqlite::Transaction;

/// Transaction boundary shared by every write. Operations on one unit of
/// work see each other's changes; nothing is visible to other connections
/// until [`UnitOfWork::commit`].
pub struct UnitOfWork<'a> {
    pub(super) tx: Transaction<'a>,
    pub(super) config: &'a StoreConfig,
}

impl<'a> UnitOfWork<'a> {
    pub(super) fn new(tx: Transaction<'a>, config: &'a StoreConfig) -> Self {
        Self { tx, config }
    }

    pub fn config(&self) -> &StoreConfig {
        self.config
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback()?;
        Ok(())
    }
}
