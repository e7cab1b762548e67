use keepsake_types::EntityId;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// A record type managed by the store.
///
/// Everything except the identity is opaque payload: the store only
/// serializes it, hashes it for change detection, and writes it back.
///
/// ```
/// use keepsake_model::Entity;
/// use keepsake_types::EntityId;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// #[serde(rename_all = "PascalCase")]
/// struct Person {
///     id: EntityId,
///     name: String,
/// }
///
/// impl Entity for Person {
///     const TYPE_NAME: &'static str = "Person";
///
///     fn id(&self) -> EntityId {
///         self.id
///     }
///
///     fn set_id(&mut self, id: EntityId) {
///         self.id = id;
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Declared type name. Keys the collection, the default file name and
    /// the type's [`MetaData`](crate::MetaData) row, so it must be stable
    /// across releases.
    const TYPE_NAME: &'static str;

    /// Current identity. [`EntityId::UNASSIGNED`] until the first add.
    fn id(&self) -> EntityId;

    /// Overwrites the identity. Called by the store when allocating.
    fn set_id(&mut self, id: EntityId);
}
