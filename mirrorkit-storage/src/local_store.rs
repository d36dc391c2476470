use crate::error::StorageResult;
use mirrorkit_model::{MirrorEntity, SortOrder};
use mirrorkit_types::{ScopeId, StableKey};

/// Keyed persistence over mirrored entities, partitioned by scope and kind.
///
/// Every operation takes the scope explicitly; the `local_parent_id` carried
/// by an entity is overwritten with it, never used to pick the scope.
pub trait LocalStore: Send + Sync + 'static {
    /// Inserts the entity, or updates the row with the same
    /// `(scope, stable_key)`. `None` is a no-op that reports zero rows.
    fn upsert_one<E: MirrorEntity>(&self, scope: ScopeId, entity: Option<&E>) -> StorageResult<usize>;

    /// Snapshot of every entity in the scope, in insertion order.
    fn read_all_for_scope<E: MirrorEntity>(&self, scope: ScopeId) -> StorageResult<Vec<E>>;

    /// Like [`read_all_for_scope`](Self::read_all_for_scope), ordered on an
    /// indexed field. Ties keep insertion order.
    fn read_all_for_scope_ordered<E: MirrorEntity>(
        &self,
        scope: ScopeId,
        order: &SortOrder,
    ) -> StorageResult<Vec<E>>;

    /// Atomically swaps the scope's contents for `entities`, inserted in the
    /// given order. Returns the number of entities now stored in the scope.
    /// On failure the previous contents are left in place.
    fn replace_all_for_scope<E: MirrorEntity>(&self, scope: ScopeId, entities: &[E]) -> StorageResult<usize>;

    /// Removes every entity of kind `E` in the scope. Returns the count removed.
    fn delete_all_for_scope<E: MirrorEntity>(&self, scope: ScopeId) -> StorageResult<usize>;

    fn get_by_key<E: MirrorEntity>(&self, scope: ScopeId, key: &StableKey) -> StorageResult<Option<E>>;

    fn delete_one<E: MirrorEntity>(&self, scope: ScopeId, key: &StableKey) -> StorageResult<usize>;

    fn count_for_scope<E: MirrorEntity>(&self, scope: ScopeId) -> StorageResult<usize>;
}
