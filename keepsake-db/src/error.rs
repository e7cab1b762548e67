//! Error types for the store.

use keepsake_model::ModelError;
use keepsake_storage::StorageError;
use thiserror::Error;

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors surfaced by [`Store`](crate::Store).
#[derive(Debug, Error)]
pub enum DbError {
    /// Caller-fixable input: a file naming strategy that does not yield a
    /// plain file name, or two Rust types declaring the same type name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A type's file exists but does not decode into its records.
    #[error("data corruption in {file}: {source}")]
    DataCorruption {
        file: String,
        #[source]
        source: StorageError,
    },

    /// Writing a commit failed. In-memory state was rolled back and the
    /// pending changes are kept for a retry.
    #[error("save failed: {source}")]
    SaveFailed {
        #[source]
        source: StorageError,
    },

    /// Storage error outside of a commit's write phase.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A type has used up its identity space. Nothing was allocated.
    #[error("identities for `{entity_type}` are exhausted")]
    IdentityExhausted { entity_type: String },

    /// An entity could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<keepsake_types::Error> for DbError {
    fn from(err: keepsake_types::Error) -> Self {
        match err {
            keepsake_types::Error::Serialization(e) => Self::Serialization(e),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

impl From<ModelError> for DbError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::IdentityExhausted { entity_type } => Self::IdentityExhausted { entity_type },
            naming => Self::InvalidArgument(naming.to_string()),
        }
    }
}

impl DbError {
    pub(crate) fn type_conflict(type_name: &str) -> Self {
        Self::InvalidArgument(format!(
            "entity type name `{type_name}` is declared by more than one type"
        ))
    }
}
