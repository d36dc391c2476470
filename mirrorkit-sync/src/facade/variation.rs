use super::{FacadeContext, StoreFacade};
use crate::action::{Action, ActionKind};
use crate::error::DispatchFault;
use crate::remote::RemoteCollection;
use mirrorkit_model::ProductVariation;
use mirrorkit_storage::{LocalStore, MirrorStore, StorageResult};
use mirrorkit_types::{ScopeId, StableKey};
use std::sync::Arc;

/// Mirror of the variations of variable products.
///
/// Requests are scoped by the local id of the product. The remote
/// collaborator resolves that id to the product it fetches variations for.
/// A fresh listing replaces that product's variations and no other's.
pub struct ProductVariationStore<S = MirrorStore> {
    ctx: FacadeContext<S>,
    remote: Arc<dyn RemoteCollection<ProductVariation>>,
}

impl<S: LocalStore> ProductVariationStore<S> {
    pub const NAME: &'static str = "product_variations";

    const KINDS: &'static [ActionKind] = &[ActionKind::FetchProductVariations];

    pub fn new(ctx: FacadeContext<S>, remote: Arc<dyn RemoteCollection<ProductVariation>>) -> Self {
        Self { ctx, remote }
    }

    /// Variations of one product in the remote's menu order.
    pub fn get_variations_for_product(&self, product: ScopeId) -> StorageResult<Vec<ProductVariation>> {
        self.ctx
            .store()
            .read_all_for_scope_ordered(product, &ProductVariation::menu_order())
    }

    pub fn get_variation_by_remote_id(
        &self,
        product: ScopeId,
        remote_variation_id: i64,
    ) -> StorageResult<Option<ProductVariation>> {
        self.ctx.store().get_by_key(product, &StableKey::remote(remote_variation_id))
    }

    pub fn delete_variations_for_product(&self, product: ScopeId) -> StorageResult<usize> {
        self.ctx.store().delete_all_for_scope::<ProductVariation>(product)
    }
}

impl<S: LocalStore> StoreFacade for ProductVariationStore<S> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn handled_kinds(&self) -> &'static [ActionKind] {
        Self::KINDS
    }

    fn on_action(&self, action: &Action) -> Result<(), DispatchFault> {
        self.ctx.ensure_open(Self::NAME)?;
        let Action::FetchProductVariations(request) = action else {
            return Err(DispatchFault::new(format!("{} does not handle {}", Self::NAME, action.kind())));
        };
        let ctx = self.ctx.clone();
        let remote = Arc::clone(&self.remote);
        let request = request.clone();
        let page_size = ctx.config().variation_page_size;
        self.ctx.spawn_request(action, async move {
            Action::FetchedProductVariations(ctx.fetch_listing(remote.as_ref(), request, page_size).await)
        });
        Ok(())
    }
}
