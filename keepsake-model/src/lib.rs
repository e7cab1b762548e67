//! Entity model for keepsake.
//!
//! Defines the contract between caller-owned record types and the store:
//! - [`Entity`]: the capability every stored type implements. It names the
//!   type and exposes a typed identity accessor and mutator.
//! - [`MetaData`]: the engine's own bookkeeping row tracking the next
//!   identity per entity type. Stored like any other entity.
//! - [`FileNaming`]: maps an entity type name to its file name.
//!
//! The on-disk shape of [`MetaData`] (`Id`, `EntityTypeName`, `NextId`) is
//! part of the storage contract.

mod entity;
mod error;
mod metadata;
mod naming;

pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use metadata::MetaData;
pub use naming::{FileNaming, DEFAULT_EXTENSION};
