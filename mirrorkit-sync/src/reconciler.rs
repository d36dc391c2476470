//! Applies authoritative remote data to the local store.

use crate::action::FetchFilter;
use mirrorkit_model::MirrorEntity;
use mirrorkit_storage::{LocalStore, StorageResult};
use mirrorkit_types::ScopeId;
use std::sync::Arc;
use tracing::debug;

/// How a batch of remote entities is applied to a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStrategy {
    /// Upsert each entity; local entities missing from the batch stay.
    UpsertMerge,
    /// Make the scope hold exactly the batch. Remote deletions propagate.
    ReplaceAll,
}

impl ReconcileStrategy {
    /// Only a fresh listing is authoritative for the whole scope. Later
    /// pages and filtered fetches are merged so entities outside the fetched
    /// slice survive.
    pub fn for_listing(filter: &FetchFilter) -> Self {
        if filter.is_fresh_listing() {
            ReconcileStrategy::ReplaceAll
        } else {
            ReconcileStrategy::UpsertMerge
        }
    }
}

/// Applies remote results to a [`LocalStore`].
///
/// Callers must never hand a failed fetch to the reconciler: an empty batch
/// under [`ReconcileStrategy::ReplaceAll`] clears the scope.
pub struct Reconciler<S> {
    store: Arc<S>,
}

impl<S> Clone for Reconciler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: LocalStore> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Applies `incoming` with the given strategy.
    ///
    /// Returns the summed rows affected for [`ReconcileStrategy::UpsertMerge`]
    /// and the number of entities now in the scope for
    /// [`ReconcileStrategy::ReplaceAll`].
    pub fn reconcile<E: MirrorEntity>(
        &self,
        scope: ScopeId,
        strategy: ReconcileStrategy,
        incoming: &[E],
    ) -> StorageResult<usize> {
        let rows = match strategy {
            ReconcileStrategy::UpsertMerge => self.upsert_merge(scope, incoming)?,
            ReconcileStrategy::ReplaceAll => self.replace_all(scope, incoming)?,
        };
        debug!(kind = %E::KIND, %scope, ?strategy, incoming = incoming.len(), rows, "reconciled");
        Ok(rows)
    }

    pub fn upsert_merge<E: MirrorEntity>(&self, scope: ScopeId, incoming: &[E]) -> StorageResult<usize> {
        let mut rows = 0;
        for entity in incoming {
            rows += self.store.upsert_one(scope, Some(entity))?;
        }
        Ok(rows)
    }

    pub fn replace_all<E: MirrorEntity>(&self, scope: ScopeId, incoming: &[E]) -> StorageResult<usize> {
        self.store.replace_all_for_scope(scope, incoming)
    }

    /// Upserts one entity. `None` (the remote had nothing) affects no rows.
    pub fn upsert_single<E: MirrorEntity>(&self, scope: ScopeId, entity: Option<&E>) -> StorageResult<usize> {
        self.store.upsert_one(scope, entity)
    }

    /// Removes the local copy of an entity the remote no longer lists.
    pub fn remove_single<E: MirrorEntity>(&self, scope: ScopeId, entity: &E) -> StorageResult<usize> {
        self.store.delete_one::<E>(scope, &entity.stable_key())
    }
}
