use super::{FacadeContext, StoreFacade};
use crate::action::{Action, ActionKind};
use crate::error::DispatchFault;
use crate::remote::RemoteCollection;
use mirrorkit_model::{Product, ProductSorting};
use mirrorkit_storage::{LocalStore, MirrorStore, StorageResult};
use mirrorkit_types::{ScopeId, StableKey};
use std::sync::Arc;

/// Mirror of a site's product catalog.
///
/// A fresh `FETCH_PRODUCTS` listing replaces the site's products; later
/// pages and filtered fetches are merged. `SEARCH_PRODUCTS` only reports
/// what the remote matched.
pub struct ProductStore<S = MirrorStore> {
    ctx: FacadeContext<S>,
    remote: Arc<dyn RemoteCollection<Product>>,
}

impl<S: LocalStore> ProductStore<S> {
    pub const NAME: &'static str = "products";

    const KINDS: &'static [ActionKind] = &[
        ActionKind::FetchProducts,
        ActionKind::FetchSingleProduct,
        ActionKind::UpdateProduct,
        ActionKind::SearchProducts,
    ];

    pub fn new(ctx: FacadeContext<S>, remote: Arc<dyn RemoteCollection<Product>>) -> Self {
        Self { ctx, remote }
    }

    pub fn get_products_for_site(&self, site: ScopeId, sorting: ProductSorting) -> StorageResult<Vec<Product>> {
        self.ctx
            .store()
            .read_all_for_scope_ordered(site, &sorting.sort_order())
    }

    pub fn get_product_by_remote_id(&self, site: ScopeId, remote_product_id: i64) -> StorageResult<Option<Product>> {
        self.ctx.store().get_by_key(site, &StableKey::remote(remote_product_id))
    }

    /// Products found locally for the given ids, in the order asked. Missing
    /// ids are skipped.
    pub fn get_products_by_remote_ids(&self, site: ScopeId, remote_product_ids: &[i64]) -> StorageResult<Vec<Product>> {
        let mut products = Vec::with_capacity(remote_product_ids.len());
        for id in remote_product_ids {
            if let Some(product) = self.get_product_by_remote_id(site, *id)? {
                products.push(product);
            }
        }
        Ok(products)
    }

    pub fn get_products_count(&self, site: ScopeId) -> StorageResult<usize> {
        self.ctx.store().count_for_scope::<Product>(site)
    }

    pub fn delete_products_for_site(&self, site: ScopeId) -> StorageResult<usize> {
        self.ctx.store().delete_all_for_scope::<Product>(site)
    }
}

impl<S: LocalStore> StoreFacade for ProductStore<S> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handled_kinds(&self) -> &'static [ActionKind] {
        Self::KINDS
    }

    fn on_action(&self, action: &Action) -> Result<(), DispatchFault> {
        self.ctx.ensure_open(Self::NAME)?;
        let ctx = self.ctx.clone();
        let remote = Arc::clone(&self.remote);
        match action {
            Action::FetchProducts(request) => {
                let request = request.clone();
                let page_size = ctx.config().product_page_size;
                self.ctx.spawn_request(action, async move {
                    Action::FetchedProducts(ctx.fetch_listing(remote.as_ref(), request, page_size).await)
                });
            }
            Action::FetchSingleProduct(request) => {
                let request = request.clone();
                self.ctx.spawn_request(action, async move {
                    Action::FetchedSingleProduct(ctx.fetch_single(remote.as_ref(), request).await)
                });
            }
            Action::UpdateProduct(request) => {
                let request = request.clone();
                self.ctx.spawn_request(action, async move {
                    let outcome = ctx
                        .mutate(remote.as_ref(), request, |r, site, product| {
                            r.upsert_single(site, Some(product))
                        })
                        .await;
                    Action::UpdatedProduct(outcome)
                });
            }
            Action::SearchProducts(request) => {
                let request = request.clone();
                let page_size = ctx.config().product_page_size;
                self.ctx.spawn_request(action, async move {
                    Action::SearchedProducts(ctx.search(remote.as_ref(), request, page_size).await)
                });
            }
            other => {
                return Err(DispatchFault::new(format!("{} does not handle {}", Self::NAME, other.kind())));
            }
        }
        Ok(())
    }
}
