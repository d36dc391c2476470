use mirrorkit_model::{Product, ProductReview};
use mirrorkit_storage::{LocalStore, MirrorStore};
use mirrorkit_sync::{FetchFilter, ReconcileStrategy, Reconciler};
use mirrorkit_types::ScopeId;
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SITE: ScopeId = ScopeId::new(7);

fn reconciler() -> Reconciler<MirrorStore> {
    Reconciler::new(Arc::new(MirrorStore::open_in_memory().unwrap()))
}

fn products(ids: &[i64]) -> Vec<Product> {
    ids.iter().map(|&id| Product::new(id, format!("product-{id}"))).collect()
}

fn stored_ids(reconciler: &Reconciler<MirrorStore>) -> Vec<i64> {
    reconciler
        .store()
        .read_all_for_scope::<Product>(SITE)
        .unwrap()
        .iter()
        .map(|p| p.remote_product_id)
        .collect()
}

// ── Strategy ─────────────────────────────────────────────────────

#[test]
fn fresh_listing_replaces_and_pages_merge() {
    assert_eq!(ReconcileStrategy::for_listing(&FetchFilter::first_page()), ReconcileStrategy::ReplaceAll);
    assert_eq!(ReconcileStrategy::for_listing(&FetchFilter::page(25)), ReconcileStrategy::UpsertMerge);
    assert_eq!(
        ReconcileStrategy::for_listing(&FetchFilter::first_page().with_param("product", "12")),
        ReconcileStrategy::UpsertMerge
    );
}

// ── Listings ─────────────────────────────────────────────────────

#[test]
fn replace_all_propagates_remote_deletions() {
    let reconciler = reconciler();
    reconciler.reconcile(SITE, ReconcileStrategy::UpsertMerge, &products(&[1, 2, 3, 4])).unwrap();

    let rows = reconciler.reconcile(SITE, ReconcileStrategy::ReplaceAll, &products(&[2, 5])).unwrap();

    assert_eq!(rows, 2);
    assert_eq!(stored_ids(&reconciler), vec![2, 5]);
}

#[test]
fn upsert_merge_keeps_entities_missing_from_batch() {
    let reconciler = reconciler();
    reconciler.reconcile(SITE, ReconcileStrategy::ReplaceAll, &products(&[1, 2])).unwrap();

    let mut changed = products(&[2, 3]);
    changed[0].name = "renamed".into();
    let rows = reconciler.reconcile(SITE, ReconcileStrategy::UpsertMerge, &changed).unwrap();

    assert_eq!(rows, 2);
    let stored = reconciler.store().read_all_for_scope::<Product>(SITE).unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored.iter().find(|p| p.remote_product_id == 2).unwrap().name, "renamed");
}

#[test]
fn empty_fresh_listing_clears_the_scope() {
    let reconciler = reconciler();
    reconciler.reconcile(SITE, ReconcileStrategy::ReplaceAll, &products(&[1, 2])).unwrap();
    let rows = reconciler.reconcile::<Product>(SITE, ReconcileStrategy::ReplaceAll, &[]).unwrap();
    assert_eq!(rows, 0);
    assert!(stored_ids(&reconciler).is_empty());
}

#[test]
fn other_scopes_are_untouched() {
    let reconciler = reconciler();
    let other = ScopeId::new(8);
    reconciler.reconcile(other, ReconcileStrategy::ReplaceAll, &products(&[1])).unwrap();
    reconciler.reconcile(SITE, ReconcileStrategy::ReplaceAll, &products(&[9])).unwrap();
    assert_eq!(reconciler.store().count_for_scope::<Product>(other).unwrap(), 1);
}

// ── Single entities ──────────────────────────────────────────────

#[test]
fn upsert_single_none_affects_nothing() {
    let reconciler = reconciler();
    reconciler.reconcile(SITE, ReconcileStrategy::ReplaceAll, &products(&[1])).unwrap();
    assert_eq!(reconciler.upsert_single::<Product>(SITE, None).unwrap(), 0);
    assert_eq!(stored_ids(&reconciler), vec![1]);
}

#[test]
fn remove_single_deletes_by_stable_key() {
    let reconciler = reconciler();
    let reviews = vec![ProductReview::new(10, 1), ProductReview::new(11, 1)];
    reconciler.reconcile(SITE, ReconcileStrategy::ReplaceAll, &reviews).unwrap();

    let mut spam = reviews[0].clone();
    spam.status = "spam".into();
    assert_eq!(reconciler.remove_single(SITE, &spam).unwrap(), 1);
    assert_eq!(reconciler.remove_single(SITE, &spam).unwrap(), 0);

    let left = reconciler.store().read_all_for_scope::<ProductReview>(SITE).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].remote_review_id, 11);
}
