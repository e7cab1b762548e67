//! The commit engine.
//!
//! A commit runs in two phases:
//!
//! - **Prepare** (under the state lock): queue an Update for the MetaData
//!   collection, turn silent field changes on loaded entities into implicit
//!   Updates, replay the intent log against each affected collection, and
//!   encode every affected collection.
//! - **Write** (state lock released, commit gate held): each encoded file
//!   goes through the temp-file-then-replace protocol.
//!
//! On success the consumed intents are dropped and snapshots are rebased on
//! the committed state. On failure the affected collections are restored;
//! the intent log was never modified, so the same changes are retried by
//! the next commit. Files already replaced by the failed commit stay
//! replaced.

use crate::erased::AnyCollection;
use crate::intents::Action;
use crate::registry::Loader;
use crate::snapshot::SnapshotTracker;
use crate::state::StoreState;
use crate::{DbError, DbResult};
use keepsake_model::{Entity, MetaData};
use std::collections::BTreeMap;
use tracing::debug;

/// One encoded collection awaiting its durable write.
pub(crate) struct StagedWrite {
    pub(crate) entity_type: &'static str,
    pub(crate) file: String,
    pub(crate) bytes: Vec<u8>,
}

/// Output of the prepare phase.
pub(crate) struct CommitPlan {
    pub(crate) writes: Vec<StagedWrite>,
    /// Applied operations on non-MetaData types.
    pub(crate) affected: usize,
    batch_len: usize,
    backup: Vec<(&'static str, Option<Box<dyn AnyCollection>>)>,
    baseline: SnapshotTracker,
    generation: u64,
}

/// MetaData sorts first so identity counters reach disk before the entities
/// that carry them; everything else follows by type name.
type GroupKey = (bool, &'static str);

fn group_key(type_name: &'static str) -> GroupKey {
    (type_name != MetaData::TYPE_NAME, type_name)
}

pub(crate) fn prepare(state: &mut StoreState, loader: &Loader<'_>) -> DbResult<CommitPlan> {
    queue_metadata_update(state)?;
    detect_changes(state)?;

    let batch_len = state.intents.len();
    let mut groups: BTreeMap<GroupKey, Vec<usize>> = BTreeMap::new();
    for (index, intent) in state.intents.entries().iter().enumerate() {
        groups
            .entry(group_key(intent.entity.type_name()))
            .or_default()
            .push(index);
    }

    let backup: Vec<_> = groups
        .keys()
        .map(|&(_, name)| (name, state.registry.get(name).map(|c| c.clone_box())))
        .collect();

    match apply(state, loader, &groups) {
        Ok((writes, affected, baseline)) => Ok(CommitPlan {
            writes,
            affected,
            batch_len,
            backup,
            baseline,
            generation: state.snapshots.generation(),
        }),
        Err(e) => {
            restore(state, backup);
            Err(e)
        }
    }
}

/// Success: drop the consumed intents and rebase snapshots on what was
/// written. Intents recorded during the write phase stay pending.
pub(crate) fn finish(state: &mut StoreState, plan: CommitPlan) {
    state.intents.drain_front(plan.batch_len);
    state.snapshots.rebase(plan.baseline, plan.generation);

    let removed: Vec<_> = state
        .intents
        .entries()
        .iter()
        .filter(|i| i.action == Action::Remove)
        .map(|i| i.entity.key())
        .collect();
    for key in removed {
        state.snapshots.evict(key);
    }
}

/// Failure: put the affected collections back as they were.
pub(crate) fn rollback(state: &mut StoreState, plan: CommitPlan) {
    restore(state, plan.backup);
}

fn restore(state: &mut StoreState, backup: Vec<(&'static str, Option<Box<dyn AnyCollection>>)>) {
    for (name, saved) in backup {
        state.registry.restore(name, saved);
    }
}

/// Guarantees the MetaData file is rewritten whenever it is loaded, so
/// counters advanced by this process are persisted with the commit.
fn queue_metadata_update(state: &mut StoreState) -> DbResult<()> {
    let representative = state
        .registry
        .typed::<MetaData>()?
        .and_then(|c| c.items.first().cloned());
    if let Some(row) = representative {
        state.snapshots.track(&row)?;
        state.intents.push(Action::Update, Box::new(row));
    }
    Ok(())
}

/// Queues an Update for every loaded entity whose fields changed without an
/// explicit `update` call. Entities without a snapshot count as changed.
fn detect_changes(state: &mut StoreState) -> DbResult<()> {
    let referenced = state.intents.keys();
    let mut drifted = Vec::new();

    for collection in state.registry.iter() {
        for entity in collection.entities() {
            if referenced.contains(&entity.key()) {
                continue;
            }
            let digest = entity.digest()?;
            match state.snapshots.get(entity.key()) {
                Some(known) if known == digest => {}
                _ => drifted.push((entity, digest)),
            }
        }
    }

    for (entity, digest) in drifted {
        debug!(entity_type = entity.type_name(), id = %entity.id(), "Detected direct modification");
        state.snapshots.record(&*entity, digest);
        state.intents.push(Action::Update, entity);
    }
    Ok(())
}

fn apply(
    state: &mut StoreState,
    loader: &Loader<'_>,
    groups: &BTreeMap<GroupKey, Vec<usize>>,
) -> DbResult<(Vec<StagedWrite>, usize, SnapshotTracker)> {
    let StoreState {
        registry,
        intents,
        snapshots,
    } = state;

    let mut writes = Vec::with_capacity(groups.len());
    let mut affected = 0;

    for (&(_, name), indices) in groups {
        let entries = intents.entries();
        let Some(&first) = indices.first() else {
            continue;
        };
        let collection = registry.get_or_load_for(&*entries[first].entity, loader)?;

        for &index in indices {
            let intent = &entries[index];
            let counted = collection.apply(intent.action, &*intent.entity)?;
            if counted && name != MetaData::TYPE_NAME {
                affected += 1;
            }
        }

        let (file, bytes) = loader.encode(&**collection)?;
        debug!(entity_type = name, file = %file, count = collection.len(), "Staged collection");
        writes.push(StagedWrite {
            entity_type: name,
            file,
            bytes,
        });
    }

    let baseline = SnapshotTracker::baseline(registry.iter(), snapshots.generation())?;
    Ok((writes, affected, baseline))
}
