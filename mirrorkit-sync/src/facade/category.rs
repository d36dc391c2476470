use super::{FacadeContext, StoreFacade};
use crate::action::{Action, ActionKind};
use crate::error::DispatchFault;
use crate::remote::RemoteCollection;
use mirrorkit_model::{CategorySorting, ProductCategory};
use mirrorkit_storage::{LocalStore, MirrorStore, StorageResult};
use mirrorkit_types::{ScopeId, StableKey};
use std::sync::Arc;

pub struct ProductCategoryStore<S = MirrorStore> {
    ctx: FacadeContext<S>,
    remote: Arc<dyn RemoteCollection<ProductCategory>>,
}

impl<S: LocalStore> ProductCategoryStore<S> {
    pub const NAME: &'static str = "product_categories";

    const KINDS: &'static [ActionKind] = &[ActionKind::FetchProductCategories, ActionKind::AddProductCategory];

    pub fn new(ctx: FacadeContext<S>, remote: Arc<dyn RemoteCollection<ProductCategory>>) -> Self {
        Self { ctx, remote }
    }

    pub fn get_categories_for_site(
        &self,
        site: ScopeId,
        sorting: CategorySorting,
    ) -> StorageResult<Vec<ProductCategory>> {
        self.ctx
            .store()
            .read_all_for_scope_ordered(site, &sorting.sort_order())
    }

    pub fn get_category_by_remote_id(
        &self,
        site: ScopeId,
        remote_category_id: i64,
    ) -> StorageResult<Option<ProductCategory>> {
        self.ctx.store().get_by_key(site, &StableKey::remote(remote_category_id))
    }

    pub fn delete_categories_for_site(&self, site: ScopeId) -> StorageResult<usize> {
        self.ctx.store().delete_all_for_scope::<ProductCategory>(site)
    }
}

impl<S: LocalStore> StoreFacade for ProductCategoryStore<S> {
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
            Action::FetchProductCategories(request) => {
                let request = request.clone();
                let page_size = ctx.config().category_page_size;
                self.ctx.spawn_request(action, async move {
                    Action::FetchedProductCategories(ctx.fetch_listing(remote.as_ref(), request, page_size).await)
                });
            }
            Action::AddProductCategory(request) => {
                let request = request.clone();
                self.ctx.spawn_request(action, async move {
                    let outcome = ctx
                        .mutate(remote.as_ref(), request, |r, site, category| {
                            r.upsert_single(site, Some(category))
                        })
                        .await;
                    Action::AddedProductCategory(outcome)
                });
            }
            other => {
                return Err(DispatchFault::new(format!("{} does not handle {}", Self::NAME, other.kind())));
            }
        }
        Ok(())
    }
}
