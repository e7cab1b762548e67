//! The pending-intent log.
//!
//! Mutation calls append intents in call order. Duplicates for the same
//! entity are kept and replayed in order at commit, so the last physical
//! effect wins. A commit consumes the intents that existed when it started;
//! anything appended while its files are being written stays pending.

use crate::erased::AnyEntity;
use crate::handle::{EntityKey, EntityRef};
use keepsake_model::Entity;
use keepsake_types::EntityId;
use std::collections::HashSet;

/// What a pending intent does to its collection at commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Add,
    Update,
    Remove,
}

/// Read-only description of a pending intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentSummary {
    pub entity_type: &'static str,
    pub id: EntityId,
    pub action: Action,
}

pub(crate) struct PendingIntent {
    pub(crate) action: Action,
    pub(crate) entity: Box<dyn AnyEntity>,
}

impl PendingIntent {
    pub(crate) fn summary(&self) -> IntentSummary {
        IntentSummary {
            entity_type: self.entity.type_name(),
            id: self.entity.id(),
            action: self.action,
        }
    }
}

#[derive(Default)]
pub(crate) struct IntentLog {
    entries: Vec<PendingIntent>,
}

impl IntentLog {
    pub(crate) fn push(&mut self, action: Action, entity: Box<dyn AnyEntity>) {
        self.entries.push(PendingIntent { action, entity });
    }

    pub(crate) fn entries(&self) -> &[PendingIntent] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of every entity referenced by a pending intent.
    pub(crate) fn keys(&self) -> HashSet<EntityKey> {
        self.entries.iter().map(|i| i.entity.key()).collect()
    }

    /// Handles of type `T` with a pending intent of `action`, in log order.
    pub(crate) fn typed<T: Entity>(&self, action: Action) -> impl Iterator<Item = &EntityRef<T>> {
        self.entries
            .iter()
            .filter(move |i| i.action == action)
            .filter_map(|i| i.entity.as_any().downcast_ref::<EntityRef<T>>())
    }

    /// Drops the first `count` intents (the batch a commit consumed).
    pub(crate) fn drain_front(&mut self, count: usize) {
        let count = count.min(self.entries.len());
        self.entries.drain(..count);
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&PendingIntent) -> bool) {
        self.entries.retain(keep);
    }
}
