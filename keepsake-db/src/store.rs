//! The public store facade.

use crate::collection::{Collection, EntitySet};
use crate::commit;
use crate::config::StoreConfig;
use crate::handle::EntityRef;
use crate::intents::IntentSummary;
use crate::registry::Loader;
use crate::state::StoreState;
use crate::{DbError, DbResult};
use keepsake_model::Entity;
use keepsake_storage::{
    write_durable, Codec, FsBackend, JsonCodec, MemoryBackend, StorageBackend, StorageResult,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// An embedded, file-backed object store.
///
/// Holds one in-memory collection per entity type, loaded on first access.
/// Mutations are recorded as pending intents and reach disk on
/// [`commit`](Self::commit), one file per affected type.
///
/// `Store` is `Sync`: share it behind an `Arc`. Every call is serialized
/// against every other call on the same store, except that mutations may
/// proceed while a commit is writing files. Commits never overlap.
pub struct Store {
    config: StoreConfig,
    backend: Arc<dyn StorageBackend>,
    codec: Arc<dyn Codec>,
    state: Mutex<StoreState>,
    /// Held for the whole of a commit.
    commit_gate: Mutex<()>,
}

impl Store {
    /// Opens (or creates) a store rooted at `config.root`.
    ///
    /// Temp files left behind by an interrupted commit are removed.
    pub fn open(config: StoreConfig) -> DbResult<Self> {
        let backend = FsBackend::open(&config.root)?;
        let swept = backend.sweep_temp_files()?;
        if swept > 0 {
            warn!(
                root = %config.root.display(),
                count = swept,
                "Removed temp files left by an interrupted commit"
            );
        }
        let codec = config.codec();
        info!(root = %config.root.display(), "Opened store");
        Ok(Self::with_backend(config, Arc::new(backend), Arc::new(codec)))
    }

    /// Opens a store whose files live in memory (for testing).
    pub fn open_in_memory() -> Self {
        Self::with_backend(
            StoreConfig::new(""),
            Arc::new(MemoryBackend::new()),
            Arc::new(JsonCodec::default()),
        )
    }

    /// Builds a store over any backend and codec. `config.root` and
    /// `config.pretty` are not consulted.
    pub fn with_backend(
        config: StoreConfig,
        backend: Arc<dyn StorageBackend>,
        codec: Arc<dyn Codec>,
    ) -> Self {
        Self {
            config,
            backend,
            codec,
            state: Mutex::new(StoreState::default()),
            commit_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn loader(&self) -> Loader<'_> {
        Loader {
            backend: &*self.backend,
            codec: &*self.codec,
            naming: &self.config.naming,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_commit(&self) -> MutexGuard<'_, ()> {
        self.commit_gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Queries ──────────────────────────────────────────────────

    /// The current committed records of `T`, loading them on first access.
    ///
    /// Pending intents are not reflected until they are committed.
    pub fn get_collection<T: Entity>(&self) -> DbResult<Collection<T>> {
        let loader = self.loader();
        let mut state = self.lock_state();
        let collection = state.ensure_loaded::<T>(&loader)?;
        Ok(Collection::new(collection.items.clone()))
    }

    /// Typed view forwarding to this store.
    pub fn set<T: Entity>(&self) -> EntitySet<'_, T> {
        EntitySet::new(self)
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Queues `entity` for insertion, allocating an identity if it has none.
    pub fn add<T: Entity>(&self, entity: &EntityRef<T>) -> DbResult<()> {
        let loader = self.loader();
        self.lock_state().add(entity, &loader)
    }

    /// Adds every entity in order. Nothing is queued if any entity fails to
    /// serialize.
    pub fn add_range<'a, T, I>(&self, entities: I) -> DbResult<()>
    where
        T: Entity,
        I: IntoIterator<Item = &'a EntityRef<T>>,
    {
        let entities: Vec<_> = entities.into_iter().cloned().collect();
        let loader = self.loader();
        self.lock_state().add_range(&entities, &loader)
    }

    /// Queues an update. A tracked entity whose fields have not changed
    /// since it was last seen is left alone.
    pub fn update<T: Entity>(&self, entity: &EntityRef<T>) -> DbResult<()> {
        let mut state = self.lock_state();
        let digest = entity.digest()?;
        state.update(entity, digest);
        Ok(())
    }

    /// Updates every entity in order. Nothing is queued if any entity fails
    /// to serialize.
    pub fn update_range<'a, T, I>(&self, entities: I) -> DbResult<()>
    where
        T: Entity,
        I: IntoIterator<Item = &'a EntityRef<T>>,
    {
        let mut state = self.lock_state();
        let digests = entities
            .into_iter()
            .map(|e| e.digest().map(|d| (e, d)))
            .collect::<DbResult<Vec<_>>>()?;
        for (entity, digest) in digests {
            state.update(entity, digest);
        }
        Ok(())
    }

    /// Queues removal, whether or not the entity is currently stored.
    pub fn remove<T: Entity>(&self, entity: &EntityRef<T>) {
        self.lock_state().remove(entity);
    }

    pub fn remove_range<'a, T, I>(&self, entities: I)
    where
        T: Entity,
        I: IntoIterator<Item = &'a EntityRef<T>>,
    {
        let mut state = self.lock_state();
        for entity in entities {
            state.remove(entity);
        }
    }

    // ── Commit ───────────────────────────────────────────────────

    /// Applies all pending intents and field changes and writes every
    /// affected type's file.
    ///
    /// Returns the number of add, update and remove operations applied to
    /// caller entity types. On [`DbError::SaveFailed`] in-memory state is
    /// as it was before the call and the pending changes are kept.
    pub fn commit(&self) -> DbResult<usize> {
        let _gate = self.lock_commit();
        let loader = self.loader();

        let plan = {
            let mut state = self.lock_state();
            commit::prepare(&mut state, &loader)?
        };

        let mut written = 0;
        let result = plan.writes.iter().try_for_each(|w| -> StorageResult<()> {
            write_durable(&*self.backend, &w.file, &w.bytes)?;
            debug!(entity_type = w.entity_type, file = %w.file, "Wrote collection");
            written += 1;
            Ok(())
        });

        let mut state = self.lock_state();
        match result {
            Ok(()) => {
                let affected = plan.affected;
                commit::finish(&mut state, plan);
                info!(affected, files = written, "Committed");
                Ok(affected)
            }
            Err(source) => {
                warn!(error = %source, files_written = written, "Commit failed, rolling back");
                commit::rollback(&mut state, plan);
                Err(DbError::SaveFailed { source })
            }
        }
    }

    // ── Inspection ───────────────────────────────────────────────

    /// Whether `entity` differs from its last-known state. Entities the
    /// store is not tracking report `true`.
    pub fn is_dirty<T: Entity>(&self, entity: &EntityRef<T>) -> DbResult<bool> {
        self.lock_state().is_dirty(entity)
    }

    /// Number of explicitly recorded intents awaiting commit.
    pub fn pending_count(&self) -> usize {
        self.lock_state().intents.len()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.lock_state().intents.is_empty()
    }

    pub fn pending_intents(&self) -> Vec<IntentSummary> {
        self.lock_state()
            .intents
            .entries()
            .iter()
            .map(|i| i.summary())
            .collect()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Drops pending intents for caller types. Identity bookkeeping is kept
    /// so issued identities stay retired. Waits for a running commit.
    ///
    /// Field changes made directly through handles are not intents; the
    /// next commit still picks them up, including edits whose implicit
    /// Update was discarded. Entities whose pending remove was discarded
    /// are rewritten once by that commit.
    pub fn discard_changes(&self) {
        let _gate = self.lock_commit();
        self.lock_state().discard_changes();
    }

    /// Forgets every loaded collection, pending intent and snapshot of the
    /// caller's types. The next access reloads them from storage. Identity
    /// bookkeeping is kept, so identities handed out but never committed
    /// are not issued again. Waits for a running commit.
    pub fn reset(&self) {
        let _gate = self.lock_commit();
        self.lock_state().reset();
        debug!("Store reset");
    }
}
