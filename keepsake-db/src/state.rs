//! Shared mutable state of a store and the mutation operations on it.
//!
//! Everything here runs under the store's state lock. Mutations only touch
//! the intent log and snapshots; collections change only at commit.

use crate::allocator;
use crate::erased::TypedCollection;
use crate::handle::EntityRef;
use crate::intents::{Action, IntentLog};
use crate::registry::{Loader, Registry};
use crate::snapshot::SnapshotTracker;
use crate::{DbError, DbResult};
use keepsake_model::{Entity, MetaData};
use keepsake_types::ContentDigest;

#[derive(Default)]
pub(crate) struct StoreState {
    pub(crate) registry: Registry,
    pub(crate) intents: IntentLog,
    pub(crate) snapshots: SnapshotTracker,
}

impl StoreState {
    /// `T`'s collection, loading and snapshotting it on first access.
    pub(crate) fn ensure_loaded<T: Entity>(
        &mut self,
        loader: &Loader<'_>,
    ) -> DbResult<&mut TypedCollection<T>> {
        if !self.registry.is_loaded(T::TYPE_NAME) {
            let collection = loader.load::<T>()?;
            for entity in &collection.items {
                self.snapshots.track(entity)?;
            }
            self.registry.insert(Box::new(collection));
        }
        self.registry
            .typed_mut::<T>()?
            .ok_or_else(|| DbError::type_conflict(T::TYPE_NAME))
    }

    pub(crate) fn add<T: Entity>(&mut self, entity: &EntityRef<T>, loader: &Loader<'_>) -> DbResult<()> {
        // Fails before an identity is spent if the entity cannot serialize.
        entity.digest()?;
        if !entity.id().is_assigned() {
            let id = allocator::next_id(self, loader, T::TYPE_NAME)?;
            entity.write().set_id(id);
        }
        self.record_add(entity.clone())
    }

    /// Validates the whole batch first, then adds in iteration order.
    pub(crate) fn add_range<T: Entity>(
        &mut self,
        entities: &[EntityRef<T>],
        loader: &Loader<'_>,
    ) -> DbResult<()> {
        for entity in entities {
            entity.digest()?;
        }
        if entities.iter().any(|e| !e.id().is_assigned()) {
            self.ensure_loaded::<MetaData>(loader)?;
        }
        for entity in entities {
            self.add(entity, loader)?;
        }
        Ok(())
    }

    /// Appends an Add intent for an entity that already has its identity.
    pub(crate) fn record_add<T: Entity>(&mut self, entity: EntityRef<T>) -> DbResult<()> {
        self.snapshots.track(&entity)?;
        self.intents.push(Action::Add, Box::new(entity));
        Ok(())
    }

    /// Records an Update unless the entity is tracked and unchanged.
    /// Returns whether an intent was appended.
    pub(crate) fn update<T: Entity>(&mut self, entity: &EntityRef<T>, digest: ContentDigest) -> bool {
        if self.snapshots.get(entity.key()) == Some(digest) {
            return false;
        }
        self.snapshots.record(entity, digest);
        self.intents.push(Action::Update, Box::new(entity.clone()));
        true
    }

    pub(crate) fn remove<T: Entity>(&mut self, entity: &EntityRef<T>) {
        self.snapshots.evict(entity.key());
        self.intents.push(Action::Remove, Box::new(entity.clone()));
    }

    pub(crate) fn is_dirty<T: Entity>(&self, entity: &EntityRef<T>) -> DbResult<bool> {
        self.snapshots.is_dirty(entity)
    }

    /// Drops pending intents except MetaData ones, which carry identities
    /// that have already been handed out.
    ///
    /// Snapshots of the dropped entities are evicted as well: an Update may
    /// have refreshed one to values that never reached storage, and an
    /// untracked entity is written by the next commit.
    pub(crate) fn discard_changes(&mut self) {
        let mut dropped = Vec::new();
        self.intents.retain(|i| {
            let keep = is_metadata(i.entity.type_name());
            if !keep {
                dropped.push(i.entity.key());
            }
            keep
        });
        for key in dropped {
            self.snapshots.evict(key);
        }
    }

    /// Forgets caller types entirely. MetaData rows, their snapshots and
    /// their pending intents survive so issued identities stay retired.
    pub(crate) fn reset(&mut self) {
        self.registry.retain(is_metadata);
        self.intents.retain(|i| is_metadata(i.entity.type_name()));
        self.snapshots.retain(|e| is_metadata(e.type_name()));
    }
}

fn is_metadata(type_name: &str) -> bool {
    type_name == MetaData::TYPE_NAME
}
