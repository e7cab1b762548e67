//! Per-type identity allocation.
//!
//! Counters live in [`MetaData`] rows, which the store manages like any
//! other entity type: they load through the registry, change in place, and
//! reach disk when a commit writes the MetaData collection.

use crate::handle::EntityRef;
use crate::intents::Action;
use crate::registry::Loader;
use crate::state::StoreState;
use crate::{DbError, DbResult};
use keepsake_model::{Entity, MetaData};
use keepsake_types::EntityId;
use tracing::{debug, info};

/// Issues the next identity for `type_name`.
///
/// Issued values are retired immediately: the row is advanced in memory
/// even if the commit that would persist it later fails. Fails with
/// [`DbError::IdentityExhausted`] once a counter cannot advance.
pub(crate) fn next_id(
    state: &mut StoreState,
    loader: &Loader<'_>,
    type_name: &'static str,
) -> DbResult<EntityId> {
    state.ensure_loaded::<MetaData>(loader)?;

    if let Some(row) = find_row(state, type_name)? {
        let id = row.write().take_next_id()?;
        debug!(entity_type = type_name, id = %id, "Allocated identity");
        return Ok(id);
    }

    let row_id = max_row_id(state)?
        .next()
        .ok_or_else(|| DbError::IdentityExhausted {
            entity_type: MetaData::TYPE_NAME.to_string(),
        })?;
    let row = EntityRef::new(MetaData::new(row_id, type_name));
    let id = row.write().take_next_id()?;
    info!(entity_type = type_name, row = %row_id, "Created identity metadata row");
    state.record_add(row)?;
    debug!(entity_type = type_name, id = %id, "Allocated identity");
    Ok(id)
}

/// The row for `type_name`, whether committed or still pending its Add.
fn find_row(state: &StoreState, type_name: &str) -> DbResult<Option<EntityRef<MetaData>>> {
    let committed = state
        .registry
        .typed::<MetaData>()?
        .and_then(|c| c.items.iter().find(|r| r.read().tracks(type_name)).cloned());
    if committed.is_some() {
        return Ok(committed);
    }
    Ok(state
        .intents
        .typed::<MetaData>(Action::Add)
        .find(|r| r.read().tracks(type_name))
        .cloned())
}

fn max_row_id(state: &StoreState) -> DbResult<EntityId> {
    let committed = state
        .registry
        .typed::<MetaData>()?
        .into_iter()
        .flat_map(|c| c.items.iter())
        .map(EntityRef::id);
    let pending = state.intents.typed::<MetaData>(Action::Add).map(EntityRef::id);
    Ok(committed
        .chain(pending)
        .max()
        .unwrap_or(EntityId::UNASSIGNED))
}
