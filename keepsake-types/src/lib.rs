//! Core type definitions for keepsake.
//!
//! This crate defines the small, storage-agnostic types shared by the rest
//! of the workspace:
//! - Entity identities (positive integers allocated per entity type)
//! - Content digests used to detect drift between an entity and its last
//!   known persisted state
//!
//! Record shapes themselves belong to the caller; the engine only needs the
//! identity and a serializable body.

mod digest;
mod ids;

pub use digest::{ContentDigest, DIGEST_SIZE};
pub use ids::EntityId;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid entity id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),
}
