//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by the entity model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("entity type name is empty")]
    EmptyTypeName,

    #[error("file name for `{type_name}` is empty")]
    EmptyFileName { type_name: String },

    /// The naming strategy produced a path rather than a plain file name.
    #[error("file name `{file_name}` for `{type_name}` is not a plain file name")]
    InvalidFileName { type_name: String, file_name: String },

    /// The type's counter has reached the largest representable identity.
    #[error("identities for `{entity_type}` are exhausted")]
    IdentityExhausted { entity_type: String },
}
