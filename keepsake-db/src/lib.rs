//! Embedded, file-backed object store with change tracking.
//!
//! A [`Store`] keeps one JSON file per entity type under a root directory.
//! Each type's records are loaded into memory on first access; callers
//! record adds, updates and removals, and [`Store::commit`] writes every
//! affected type's file at once.
//!
//! - Entities implement [`Entity`] and are handled through shared
//!   [`EntityRef`] handles. The store tracks them by reference.
//! - Field changes made through a handle without an explicit `update` are
//!   picked up at commit by comparing content digests.
//! - Identities are allocated per type from counters kept in the
//!   `MetaData` collection. Once handed out, an identity is not issued
//!   again, even if the commit that would persist it fails.
//! - Files are replaced atomically. A failed commit rolls the in-memory
//!   collections back and keeps the pending changes for a retry.
//!
//! ```no_run
//! use keepsake_db::{Entity, EntityId, EntityRef, Store, StoreConfig};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Person {
//!     id: EntityId,
//!     name: String,
//! }
//!
//! impl Entity for Person {
//!     const TYPE_NAME: &'static str = "Person";
//!     fn id(&self) -> EntityId { self.id }
//!     fn set_id(&mut self, id: EntityId) { self.id = id }
//! }
//!
//! # fn main() -> keepsake_db::DbResult<()> {
//! let store = Store::open(StoreConfig::new("./data"))?;
//! let alice = EntityRef::new(Person { id: EntityId::UNASSIGNED, name: "Alice".into() });
//! store.add(&alice)?;
//! store.commit()?;
//!
//! alice.write().name = "Alicia".into();
//! assert_eq!(store.commit()?, 1);
//! # Ok(())
//! # }
//! ```

mod allocator;
mod collection;
mod commit;
mod config;
mod erased;
mod error;
mod handle;
mod intents;
mod registry;
mod snapshot;
mod state;
mod store;

pub use collection::{Collection, EntitySet};
pub use config::{StoreConfig, StoreSettings};
pub use error::{DbError, DbResult};
pub use handle::EntityRef;
pub use intents::{Action, IntentSummary};
pub use store::Store;

pub use keepsake_model::{Entity, FileNaming, MetaData, ModelError, DEFAULT_EXTENSION};
pub use keepsake_storage::{Codec, FsBackend, JsonCodec, MemoryBackend, StorageBackend, StorageError};
pub use keepsake_types::{ContentDigest, EntityId};
