#![forbid(unsafe_code)]

use super::StoreError;
use serde::Deserialize;

const DEFAULT_BATCH_SIZE: usize = 50;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_DATABASE_FILE: &str = "tm_store.db";

/// Store settings, usually read from the `[store]` table of a TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Rows written per chunk by bulk milestone bind/unbind.
    pub batch_size: usize,
    pub busy_timeout_ms: u64,
    pub database_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            database_file: DEFAULT_DATABASE_FILE.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    store: StoreConfig,
}

impl StoreConfig {
    /// Parses either a bare config table or one nested under `[store]`.
    pub fn from_toml_str(raw: &str) -> Result<Self, StoreError> {
        let value: toml::Table =
            toml::from_str(raw).map_err(|err| StoreError::Config(err.to_string()))?;
        let config = if value.contains_key("store") {
            toml::from_str::<ConfigFile>(raw)
                .map_err(|err| StoreError::Config(err.to_string()))?
                .store
        } else {
            toml::from_str::<StoreConfig>(raw)
                .map_err(|err| StoreError::Config(err.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.batch_size == 0 {
            return Err(StoreError::Config("batch_size must be positive".to_string()));
        }
        if self.database_file.trim().is_empty() {
            return Err(StoreError::Config(
                "database_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
