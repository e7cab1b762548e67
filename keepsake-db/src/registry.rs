//! The entity registry: one lazily loaded collection per entity type.

use crate::erased::{AnyCollection, AnyEntity, TypedCollection};
use crate::{DbError, DbResult};
use keepsake_model::{Entity, FileNaming};
use keepsake_storage::{Codec, StorageBackend, StorageError};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Storage collaborators needed to load and encode collections.
pub(crate) struct Loader<'a> {
    pub(crate) backend: &'a dyn StorageBackend,
    pub(crate) codec: &'a dyn Codec,
    pub(crate) naming: &'a FileNaming,
}

impl Loader<'_> {
    pub(crate) fn file_name(&self, type_name: &str) -> DbResult<String> {
        Ok(self.naming.file_name(type_name)?)
    }

    /// Reads and decodes `T`'s file. A missing file is an empty collection.
    pub(crate) fn load<T: Entity>(&self) -> DbResult<TypedCollection<T>> {
        let file = self.file_name(T::TYPE_NAME)?;
        let Some(bytes) = self.backend.read(&file)? else {
            debug!(entity_type = T::TYPE_NAME, file = %file, "No file yet, starting empty");
            return Ok(TypedCollection::default());
        };

        let value = self
            .codec
            .decode(&bytes)
            .map_err(|source| DbError::DataCorruption {
                file: file.clone(),
                source,
            })?;
        let records: Vec<T> =
            serde_json::from_value(value).map_err(|e| DbError::DataCorruption {
                file: file.clone(),
                source: StorageError::Serialization(e),
            })?;

        debug!(entity_type = T::TYPE_NAME, file = %file, count = records.len(), "Loaded collection");
        Ok(TypedCollection::from_records(records))
    }

    /// Target file name and encoded bytes for a collection.
    pub(crate) fn encode(&self, collection: &dyn AnyCollection) -> DbResult<(String, Vec<u8>)> {
        let file = self.file_name(collection.type_name())?;
        let bytes = self.codec.encode(&collection.to_value()?)?;
        Ok((file, bytes))
    }
}

#[derive(Default)]
pub(crate) struct Registry {
    collections: BTreeMap<&'static str, Box<dyn AnyCollection>>,
}

impl Registry {
    pub(crate) fn is_loaded(&self, type_name: &str) -> bool {
        self.collections.contains_key(type_name)
    }

    pub(crate) fn get(&self, type_name: &str) -> Option<&dyn AnyCollection> {
        self.collections.get(type_name).map(|c| &**c)
    }

    pub(crate) fn insert(&mut self, collection: Box<dyn AnyCollection>) {
        self.collections.insert(collection.type_name(), collection);
    }

    /// Puts back a previously taken copy, or unloads the type if it was not
    /// loaded at the time.
    pub(crate) fn restore(&mut self, type_name: &'static str, saved: Option<Box<dyn AnyCollection>>) {
        match saved {
            Some(collection) => {
                self.collections.insert(type_name, collection);
            }
            None => {
                self.collections.remove(type_name);
            }
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &dyn AnyCollection> {
        self.collections.values().map(|c| &**c)
    }

    pub(crate) fn typed<T: Entity>(&self) -> DbResult<Option<&TypedCollection<T>>> {
        match self.collections.get(T::TYPE_NAME) {
            Some(c) => c
                .as_any()
                .downcast_ref::<TypedCollection<T>>()
                .map(Some)
                .ok_or_else(|| DbError::type_conflict(T::TYPE_NAME)),
            None => Ok(None),
        }
    }

    pub(crate) fn typed_mut<T: Entity>(&mut self) -> DbResult<Option<&mut TypedCollection<T>>> {
        match self.collections.get_mut(T::TYPE_NAME) {
            Some(c) => c
                .as_any_mut()
                .downcast_mut::<TypedCollection<T>>()
                .map(Some)
                .ok_or_else(|| DbError::type_conflict(T::TYPE_NAME)),
            None => Ok(None),
        }
    }

    /// The loaded collection `entity` belongs to, loading it first if
    /// needed. Does not snapshot freshly loaded records.
    pub(crate) fn get_or_load_for(
        &mut self,
        entity: &dyn AnyEntity,
        loader: &Loader<'_>,
    ) -> DbResult<&mut Box<dyn AnyCollection>> {
        match self.collections.entry(entity.type_name()) {
            Entry::Occupied(slot) => Ok(slot.into_mut()),
            Entry::Vacant(slot) => Ok(slot.insert(entity.load_collection(loader)?)),
        }
    }

    /// Unloads every type for which `keep` returns false.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.collections.retain(|name, _| keep(*name));
    }
}
