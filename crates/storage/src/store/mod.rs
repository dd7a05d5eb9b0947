#![forbid(unsafe_code)]

mod cascade;
mod config;
mod error;
mod milestones;
mod nodes;
mod ordered;
mod requirements;
mod support;
mod test_plans;
mod types;
mod unit_of_work;

pub use config::StoreConfig;
pub use error::StoreError;
pub use types::*;
pub use unit_of_work::UnitOfWork;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use support::*;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    storage_dir: Option<PathBuf>,
    config: StoreConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_config(storage_dir, StoreConfig::default())
    }

    pub fn open_with_config(
        storage_dir: impl AsRef<Path>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        config.validate()?;
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let conn = Connection::open(storage_dir.join(&config.database_file))?;
        let store = Self::with_connection(conn, Some(storage_dir), config)?;
        tracing::debug!(
            path = ?store.storage_dir,
            batch_size = store.config.batch_size,
            "opened store"
        );
        Ok(store)
    }

    /// Private database that disappears with the store.
    pub fn open_in_memory(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Self::with_connection(Connection::open_in_memory()?, None, config)
    }

    fn with_connection(
        conn: Connection,
        storage_dir: Option<PathBuf>,
        config: StoreConfig,
    ) -> Result<Self, StoreError> {
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        install_sqlite_schema(&conn)?;
        Ok(Self {
            conn,
            storage_dir,
            config,
        })
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage_dir.as_deref()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Opens a transaction. Dropping the unit of work without committing
    /// rolls every change back.
    pub fn unit_of_work(&mut self) -> Result<UnitOfWork<'_>, StoreError> {
        let tx = self.conn.transaction()?;
        Ok(UnitOfWork::new(tx, &self.config))
    }

    /// Runs `op` in its own unit of work, committing only if it succeeds.
    pub fn write<T>(
        &mut self,
        op: impl FnOnce(&mut UnitOfWork<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut work = self.unit_of_work()?;
        let out = op(&mut work)?;
        work.commit()?;
        Ok(out)
    }

    /// Most recent events first.
    pub fn list_events(&self, limit: usize) -> Result<Vec<EventRow>, StoreError> {
        list_events(&self.conn, limit)
    }
}
