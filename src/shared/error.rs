use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// No network reachable. The sync engine turns this into a skipped
    /// cycle rather than a failure.
    #[error("no network connectivity")]
    Connectivity,

    /// The remote store rejected a bulk upsert or changed-since query for
    /// one table. The table is retried wholesale on the next cycle.
    #[error("remote rejected {table}: {message}")]
    RemoteRejected {
        table: &'static str,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("row decode error: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Errors originating on the remote side of the sync boundary. These are
    /// contained within the engine (logged, retried next cycle); everything
    /// else is a local failure that propagates to the caller.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AppError::Connectivity | AppError::RemoteRejected { .. }
        )
    }

    pub(crate) fn remote(table: &'static str, message: impl Into<String>) -> Self {
        AppError::RemoteRejected {
            table,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
