//! Type-erased views over typed entities and collections.
//!
//! The store keeps one collection per entity type in a single map and one
//! intent log across all types. Everything that needs the concrete type
//! (decoding a file, downcasting an intent's entity, re-encoding records)
//! goes through these traits, whose implementations are monomorphized per
//! entity type.

use crate::handle::{EntityKey, EntityRef};
use crate::intents::Action;
use crate::registry::Loader;
use crate::{DbError, DbResult};
use keepsake_model::Entity;
use keepsake_types::{ContentDigest, EntityId};
use serde_json::Value;
use std::any::Any;

pub(crate) trait AnyEntity: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn key(&self) -> EntityKey;
    fn id(&self) -> EntityId;
    fn digest(&self) -> DbResult<ContentDigest>;
    fn clone_box(&self) -> Box<dyn AnyEntity>;
    fn as_any(&self) -> &dyn Any;

    /// Loads the collection this entity belongs to.
    fn load_collection(&self, loader: &Loader<'_>) -> DbResult<Box<dyn AnyCollection>>;
}

impl<T: Entity> AnyEntity for EntityRef<T> {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn key(&self) -> EntityKey {
        EntityRef::key(self)
    }

    fn id(&self) -> EntityId {
        EntityRef::id(self)
    }

    fn digest(&self) -> DbResult<ContentDigest> {
        EntityRef::digest(self)
    }

    fn clone_box(&self) -> Box<dyn AnyEntity> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn load_collection(&self, loader: &Loader<'_>) -> DbResult<Box<dyn AnyCollection>> {
        Ok(Box::new(loader.load::<T>()?))
    }
}

pub(crate) trait AnyCollection: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn len(&self) -> usize;
    fn entities(&self) -> Vec<Box<dyn AnyEntity>>;

    /// Applies one intent. Returns whether it counts toward the commit's
    /// affected total.
    fn apply(&mut self, action: Action, entity: &dyn AnyEntity) -> DbResult<bool>;

    /// The full record sequence as a JSON array.
    fn to_value(&self) -> DbResult<Value>;

    fn clone_box(&self) -> Box<dyn AnyCollection>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The ordered records of one entity type.
pub(crate) struct TypedCollection<T> {
    pub(crate) items: Vec<EntityRef<T>>,
}

impl<T: Entity> TypedCollection<T> {
    pub(crate) fn from_records(records: Vec<T>) -> Self {
        Self {
            items: records.into_iter().map(EntityRef::new).collect(),
        }
    }
}

impl<T> Default for TypedCollection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Clone for TypedCollection<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: Entity> AnyCollection for TypedCollection<T> {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn entities(&self) -> Vec<Box<dyn AnyEntity>> {
        self.items
            .iter()
            .map(|e| Box::new(e.clone()) as Box<dyn AnyEntity>)
            .collect()
    }

    fn apply(&mut self, action: Action, entity: &dyn AnyEntity) -> DbResult<bool> {
        let entity = entity
            .as_any()
            .downcast_ref::<EntityRef<T>>()
            .ok_or_else(|| DbError::type_conflict(T::TYPE_NAME))?;

        let counted = match action {
            Action::Add => {
                self.items.push(entity.clone());
                true
            }
            // Matched by identity; the new value moves to the end.
            Action::Update => {
                let id = entity.id();
                match self.items.iter().position(|e| e.id() == id) {
                    Some(pos) => {
                        self.items.remove(pos);
                        self.items.push(entity.clone());
                        true
                    }
                    None => false,
                }
            }
            // Matched by reference; counted whether or not it was present.
            Action::Remove => {
                if let Some(pos) = self.items.iter().position(|e| e.ptr_eq(entity)) {
                    self.items.remove(pos);
                }
                true
            }
        };
        Ok(counted)
    }

    fn to_value(&self) -> DbResult<Value> {
        let records = self
            .items
            .iter()
            .map(|e| serde_json::to_value(&*e.read()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(records))
    }

    fn clone_box(&self) -> Box<dyn AnyCollection> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
