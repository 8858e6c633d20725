use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of the report store.
///
/// Every storage backend reports through this one type so callers can decide
/// on retries without knowing which database sits underneath.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database unavailable: {0}")]
    Unavailable(#[source] BoxError),

    #[error("corrupt report row {id}: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("failed to encode report fields: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    /// Wrap a backend error as [`StorageError::Unavailable`].
    #[must_use]
    pub fn unavailable<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Unavailable(Box::new(err))
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read reports file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
