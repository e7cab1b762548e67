use crate::{Entity, ModelError, ModelResult};
use keepsake_types::EntityId;
use serde::{Deserialize, Serialize};

/// Identity bookkeeping for one entity type.
///
/// One row exists per type that has ever had an identity allocated. The
/// serialized field names are fixed by the on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaData {
    #[serde(rename = "Id")]
    pub id: EntityId,
    #[serde(rename = "EntityTypeName")]
    pub entity_type_name: String,
    /// Next identity to hand out. Never decreases.
    #[serde(rename = "NextId")]
    pub next_id: EntityId,
}

impl MetaData {
    /// Creates a fresh row for `entity_type_name` whose first issued
    /// identity will be [`EntityId::FIRST`].
    pub fn new(id: EntityId, entity_type_name: impl Into<String>) -> Self {
        Self {
            id,
            entity_type_name: entity_type_name.into(),
            next_id: EntityId::FIRST,
        }
    }

    /// Returns the current `next_id` and advances the counter.
    ///
    /// Fails without issuing anything once the counter cannot advance.
    pub fn take_next_id(&mut self) -> ModelResult<EntityId> {
        let issued = self.next_id;
        self.next_id = issued
            .next()
            .ok_or_else(|| ModelError::IdentityExhausted {
                entity_type: self.entity_type_name.clone(),
            })?;
        Ok(issued)
    }

    /// Whether this row tracks `type_name`.
    #[must_use]
    pub fn tracks(&self, type_name: &str) -> bool {
        self.entity_type_name == type_name
    }
}

impl Entity for MetaData {
    const TYPE_NAME: &'static str = "MetaData";

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}
