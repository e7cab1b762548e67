//! Typed read views and the per-type [`EntitySet`] facade.

use crate::handle::EntityRef;
use crate::store::Store;
use crate::DbResult;
use keepsake_model::Entity;
use keepsake_types::EntityId;
use std::marker::PhantomData;
use std::ops::Deref;

/// The committed records of one entity type, in stored order.
///
/// The handles are shared with the store: mutating one and committing
/// persists the change.
#[derive(Debug)]
pub struct Collection<T> {
    items: Vec<EntityRef<T>>,
}

impl<T: Entity> Collection<T> {
    pub(crate) fn new(items: Vec<EntityRef<T>>) -> Self {
        Self { items }
    }

    /// The first record with identity `id`.
    pub fn find(&self, id: EntityId) -> Option<&EntityRef<T>> {
        self.items.iter().find(|e| e.id() == id)
    }

    /// Clones of every record's current value.
    pub fn values(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().map(EntityRef::get).collect()
    }

    pub fn into_vec(self) -> Vec<EntityRef<T>> {
        self.items
    }
}

impl<T> Deref for Collection<T> {
    type Target = [EntityRef<T>];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = EntityRef<T>;
    type IntoIter = std::vec::IntoIter<EntityRef<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a EntityRef<T>;
    type IntoIter = std::slice::Iter<'a, EntityRef<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Store operations bound to one entity type.
///
/// ```no_run
/// # use keepsake_db::{Entity, EntityId, EntityRef, Store};
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Clone, Serialize, Deserialize)]
/// # struct Note { id: EntityId, text: String }
/// # impl Entity for Note {
/// #     const TYPE_NAME: &'static str = "Note";
/// #     fn id(&self) -> EntityId { self.id }
/// #     fn set_id(&mut self, id: EntityId) { self.id = id }
/// # }
/// # fn main() -> keepsake_db::DbResult<()> {
/// let store = Store::open_in_memory();
/// let notes = store.set::<Note>();
/// let note = EntityRef::new(Note { id: EntityId::UNASSIGNED, text: "hi".into() });
/// notes.add(&note)?;
/// store.commit()?;
/// assert_eq!(notes.all()?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct EntitySet<'s, T> {
    store: &'s Store,
    _marker: PhantomData<fn() -> T>,
}

impl<'s, T: Entity> EntitySet<'s, T> {
    pub(crate) fn new(store: &'s Store) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn all(&self) -> DbResult<Collection<T>> {
        self.store.get_collection()
    }

    /// The committed record with identity `id`, if any.
    pub fn find(&self, id: EntityId) -> DbResult<Option<EntityRef<T>>> {
        Ok(self.all()?.find(id).cloned())
    }

    pub fn add(&self, entity: &EntityRef<T>) -> DbResult<()> {
        self.store.add(entity)
    }

    pub fn add_range<'a>(&self, entities: impl IntoIterator<Item = &'a EntityRef<T>>) -> DbResult<()> {
        self.store.add_range(entities)
    }

    pub fn update(&self, entity: &EntityRef<T>) -> DbResult<()> {
        self.store.update(entity)
    }

    pub fn update_range<'a>(
        &self,
        entities: impl IntoIterator<Item = &'a EntityRef<T>>,
    ) -> DbResult<()> {
        self.store.update_range(entities)
    }

    pub fn remove(&self, entity: &EntityRef<T>) {
        self.store.remove(entity);
    }

    pub fn remove_range<'a>(&self, entities: impl IntoIterator<Item = &'a EntityRef<T>>) {
        self.store.remove_range(entities);
    }

    pub fn is_dirty(&self, entity: &EntityRef<T>) -> DbResult<bool> {
        self.store.is_dirty(entity)
    }
}
