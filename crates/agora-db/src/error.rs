use agora_types::ForumError;
use rusqlite::ffi;
use thiserror::Error;
use tracing::error;

/// Failures surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("query returned no rows")]
    NoRows,

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("foreign key constraint violated")]
    InvalidReference,

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("blocking database task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NoRows,
            rusqlite::Error::SqliteFailure(code, ref msg) => match code.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    StoreError::Conflict(msg.clone().unwrap_or_default())
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => StoreError::InvalidReference,
                _ => StoreError::Sqlite(err),
            },
            other => StoreError::Sqlite(other),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Collapse a storage failure into the caller-facing taxonomy.
/// Anything that is not a constraint or a missing row is logged here and masked.
impl From<StoreError> for ForumError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NoRows => ForumError::not_found("record"),
            StoreError::Conflict(_) => ForumError::conflict("resource already exists"),
            StoreError::InvalidReference => ForumError::not_found("referenced record"),
            other => {
                error!("Storage failure: {}", other);
                ForumError::internal("internal storage error")
            }
        }
    }
}
