use crate::schema::{EntityKind, EntitySchema};
use mirrorkit_types::{ScopeId, StableKey};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// A remote-origin record mirrored into the local store.
///
/// Implementors are plain value types. The store persists them as JSON plus
/// the columns named by [`MirrorEntity::schema`], keyed by
/// `(local_parent_id, stable_key)`.
pub trait MirrorEntity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Table layout and indexed fields for this kind.
    fn schema() -> EntitySchema;

    /// The scope this entity belongs to.
    fn local_parent_id(&self) -> ScopeId;

    fn set_local_parent_id(&mut self, scope: ScopeId);

    /// Identity across reconciliation passes within a scope.
    fn stable_key(&self) -> StableKey;

    /// Returns the entity placed in `scope`.
    fn in_scope(mut self, scope: ScopeId) -> Self {
        self.set_local_parent_id(scope);
        self
    }
}
