#![forbid(unsafe_code)]

use rusqlite::ErrorCode;
use thiserror::Error;
use tm_core::model::UnknownTag;
use tm_core::ordering::OrderingError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(rusqlite::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("config: {0}")]
    Config(String),
    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: i64 },
    #[error("name {name:?} is already used in this container")]
    DuplicateName { name: String },
    #[error("milestone {milestone_id} is locked")]
    MilestoneLocked { milestone_id: i64 },
    #[error("ordering invariant violated in {scope_kind} {scope_id}: {source}")]
    OrderingInvariantViolation {
        scope_kind: &'static str,
        scope_id: i64,
        source: OrderingError,
    },
    /// Raised by the storage layer, e.g. a `(scope, position)` uniqueness clash.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("corrupt row: {0}")]
    CorruptRow(#[from] UnknownTag),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Self::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            _ => Self::Sql(value),
        }
    }
}

impl StoreError {
    pub(in crate::store) fn not_found(what: &'static str, id: i64) -> Self {
        Self::NotFound { what, id }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Sql(_)
                | Self::Io(_)
                | Self::OrderingInvariantViolation { .. }
                | Self::ConstraintViolation(_)
                | Self::CorruptRow(_)
        )
    }
}
