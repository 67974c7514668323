//! Store and orchestration errors.

use sqlx::error::ErrorKind;

use legacy_core::status::InvalidTransition;
use legacy_core::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not complete the write or read.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A status change the state machine forbids. Never retried.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error("Life event not found: {0}")]
    NotFound(DbId),

    /// A stored row holds a value the domain types do not recognise.
    #[error("Corrupt life event record: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether repeating the same operation could succeed.
    ///
    /// Transient backend failures are retryable; state-machine rejections,
    /// missing rows, corrupt rows and constraint violations are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(_) => true,
            Self::Database(e) => is_transient(e),
            Self::InvalidTransition(_) | Self::NotFound(_) | Self::Decode(_) => false,
        }
    }
}

fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => matches!(db.kind(), ErrorKind::Other),
        _ => false,
    }
}
