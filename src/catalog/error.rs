use thiserror::Error;

use crate::version::VersionError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("maintainer not found: {0}")]
    MaintainerNotFound(String),

    #[error("maintainer already exists: {0}")]
    MaintainerExists(String),

    #[error("maintainer {0} still owns application versions")]
    MaintainerNotEmpty(String),

    #[error("version {version} of {app_id} already exists for maintainer {maintainer}")]
    VersionExists {
        maintainer: String,
        app_id: String,
        version: String,
    },

    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("selector {0:?} is not valid for this operation")]
    InvalidSelector(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,

    /// Stored state violates a catalog invariant. Not retryable; indicates
    /// the database was modified outside the store.
    #[error("catalog corrupted: {0}")]
    Corrupt(String),
}
