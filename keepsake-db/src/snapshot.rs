//! Snapshot tracking for dirty detection.
//!
//! Maps each tracked entity (by reference) to the digest of its field values
//! when it was loaded, added, updated, or last committed. An entity whose
//! current digest differs from its entry has drifted.
//!
//! Entries hold a clone of the entity's handle, so an entry's key can never
//! be reused by another allocation while the entry exists.

use crate::erased::{AnyCollection, AnyEntity};
use crate::handle::EntityKey;
use crate::DbResult;
use keepsake_types::ContentDigest;
use std::collections::HashMap;

struct Tracked {
    digest: ContentDigest,
    generation: u64,
    entity: Box<dyn AnyEntity>,
}

#[derive(Default)]
pub(crate) struct SnapshotTracker {
    entries: HashMap<EntityKey, Tracked>,
    /// Bumped on every record or eviction.
    generation: u64,
}

impl SnapshotTracker {
    pub(crate) fn get(&self, key: EntityKey) -> Option<ContentDigest> {
        self.entries.get(&key).map(|t| t.digest)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: EntityKey) -> bool {
        self.entries.contains_key(&key)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Stores `digest` as the entity's last-known state.
    pub(crate) fn record(&mut self, entity: &dyn AnyEntity, digest: ContentDigest) {
        self.generation += 1;
        self.entries.insert(
            entity.key(),
            Tracked {
                digest,
                generation: self.generation,
                entity: entity.clone_box(),
            },
        );
    }

    /// Computes and stores the entity's current digest.
    pub(crate) fn track(&mut self, entity: &dyn AnyEntity) -> DbResult<ContentDigest> {
        let digest = entity.digest()?;
        self.record(entity, digest);
        Ok(digest)
    }

    /// Whether the entity differs from its snapshot. Untracked entities are
    /// always dirty.
    pub(crate) fn is_dirty(&self, entity: &dyn AnyEntity) -> DbResult<bool> {
        match self.get(entity.key()) {
            Some(known) => Ok(entity.digest()? != known),
            None => Ok(true),
        }
    }

    pub(crate) fn evict(&mut self, key: EntityKey) {
        self.generation += 1;
        self.entries.remove(&key);
    }

    /// Keeps only the entries whose entity satisfies `keep`.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&dyn AnyEntity) -> bool) {
        self.generation += 1;
        self.entries.retain(|_, tracked| keep(&*tracked.entity));
    }

    /// Snapshots of every entity in `collections`, stamped with
    /// `generation`.
    pub(crate) fn baseline<'a>(
        collections: impl Iterator<Item = &'a dyn AnyCollection>,
        generation: u64,
    ) -> DbResult<Self> {
        let mut entries = HashMap::new();
        for collection in collections {
            for entity in collection.entities() {
                let digest = entity.digest()?;
                entries.insert(
                    entity.key(),
                    Tracked {
                        digest,
                        generation,
                        entity,
                    },
                );
            }
        }
        Ok(Self {
            entries,
            generation,
        })
    }

    /// Replaces every entry with `baseline`, except entries recorded after
    /// `since`, which are newer than the baseline and win.
    pub(crate) fn rebase(&mut self, baseline: SnapshotTracker, since: u64) {
        let mut next = baseline;
        for (key, tracked) in self.entries.drain() {
            if tracked.generation > since {
                next.entries.insert(key, tracked);
            }
        }
        next.generation = self.generation.max(next.generation) + 1;
        *self = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erased::TypedCollection;
    use crate::handle::EntityRef;
    use keepsake_model::MetaData;
    use keepsake_types::EntityId;

    fn row(id: u64) -> EntityRef<MetaData> {
        EntityRef::new(MetaData::new(EntityId::new(id), "Person"))
    }

    #[test]
    fn drift_is_detected_per_reference() {
        let mut tracker = SnapshotTracker::default();
        let a = row(1);
        let b = row(1);
        tracker.track(&a).unwrap();

        assert!(!tracker.is_dirty(&a).unwrap());
        // Equal value, different reference: untracked.
        assert!(tracker.is_dirty(&b).unwrap());

        a.write().take_next_id().unwrap();
        assert!(tracker.is_dirty(&a).unwrap());
    }

    #[test]
    fn evict_removes_entry() {
        let mut tracker = SnapshotTracker::default();
        let a = row(1);
        tracker.track(&a).unwrap();
        tracker.evict(a.key());
        assert!(!tracker.contains(a.key()));
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn baseline_covers_every_entity() {
        let collection = TypedCollection {
            items: vec![row(1), row(2)],
        };
        let tracker =
            SnapshotTracker::baseline(std::iter::once(&collection as &dyn AnyCollection), 0)
                .unwrap();
        assert_eq!(tracker.len(), 2);
        assert!(!tracker.is_dirty(&collection.items[0]).unwrap());
    }

    #[test]
    fn rebase_keeps_newer_entries() {
        let committed = row(1);
        let touched_later = row(2);
        let collection = TypedCollection {
            items: vec![committed.clone(), touched_later.clone()],
        };

        let mut tracker = SnapshotTracker::default();
        tracker.track(&committed).unwrap();
        let since = tracker.generation();
        let baseline =
            SnapshotTracker::baseline(std::iter::once(&collection as &dyn AnyCollection), since)
                .unwrap();

        // Recorded after the baseline was taken, with a different value.
        touched_later.write().take_next_id().unwrap();
        tracker.track(&touched_later).unwrap();
        let newer = tracker.get(touched_later.key()).unwrap();

        tracker.rebase(baseline, since);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.get(touched_later.key()), Some(newer));
        assert!(tracker.generation() > since);
    }
}
