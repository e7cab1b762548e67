//! Shared entity handles.
//!
//! The store tracks entities by reference, not by value: two handles to the
//! same allocation are the same entity, two equal values in separate
//! handles are not. [`EntityRef`] is that reference.

use crate::DbResult;
use keepsake_model::Entity;
use keepsake_types::{ContentDigest, EntityId};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Identity of an [`EntityRef`] allocation. Stable while any clone of the
/// handle is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct EntityKey(usize);

/// A shared, mutable handle to one entity.
///
/// Clones refer to the same entity. Mutating through [`EntityRef::write`]
/// without calling `update` is fine: the next commit detects the change.
///
/// Do not hold a guard from [`read`](Self::read) or [`write`](Self::write)
/// across a call into the store; the store reads the entity itself.
pub struct EntityRef<T> {
    cell: Arc<RwLock<T>>,
}

impl<T: Entity> EntityRef<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(RwLock::new(value)),
        }
    }

    /// Current identity.
    pub fn id(&self) -> EntityId {
        self.read().id()
    }

    /// Hash of the entity's current field values.
    pub fn digest(&self) -> DbResult<ContentDigest> {
        Ok(ContentDigest::of(&*self.read())?)
    }

    pub(crate) fn key(&self) -> EntityKey {
        EntityKey(Arc::as_ptr(&self.cell) as usize)
    }
}

impl<T> EntityRef<T> {
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.cell.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.cell.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// A clone of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read().clone()
    }

    /// Whether both handles refer to the same entity.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T> Clone for EntityRef<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Entity> From<T> for EntityRef<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for EntityRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&*self.read()).finish()
    }
}
