use super::{FacadeContext, StoreFacade};
use crate::action::{Action, ActionKind};
use crate::error::DispatchFault;
use crate::remote::RemoteCollection;
use mirrorkit_model::ProductShippingClass;
use mirrorkit_storage::{LocalStore, MirrorStore, StorageResult};
use mirrorkit_types::{ScopeId, StableKey};
use std::sync::Arc;

pub struct ProductShippingClassStore<S = MirrorStore> {
    ctx: FacadeContext<S>,
    remote: Arc<dyn RemoteCollection<ProductShippingClass>>,
}

impl<S: LocalStore> ProductShippingClassStore<S> {
    pub const NAME: &'static str = "product_shipping_classes";

    const KINDS: &'static [ActionKind] = &[
        ActionKind::FetchProductShippingClassList,
        ActionKind::FetchSingleProductShippingClass,
    ];

    pub fn new(ctx: FacadeContext<S>, remote: Arc<dyn RemoteCollection<ProductShippingClass>>) -> Self {
        Self { ctx, remote }
    }

    pub fn get_shipping_classes_for_site(&self, site: ScopeId) -> StorageResult<Vec<ProductShippingClass>> {
        self.ctx.store().read_all_for_scope(site)
    }

    pub fn get_shipping_class_by_remote_id(
        &self,
        site: ScopeId,
        remote_shipping_class_id: i64,
    ) -> StorageResult<Option<ProductShippingClass>> {
        self.ctx
            .store()
            .get_by_key(site, &StableKey::remote(remote_shipping_class_id))
    }

    pub fn delete_shipping_classes_for_site(&self, site: ScopeId) -> StorageResult<usize> {
        self.ctx.store().delete_all_for_scope::<ProductShippingClass>(site)
    }
}

impl<S: LocalStore> StoreFacade for ProductShippingClassStore<S> {
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
            Action::FetchProductShippingClassList(request) => {
                let request = request.clone();
                let page_size = ctx.config().shipping_class_page_size;
                self.ctx.spawn_request(action, async move {
                    Action::FetchedProductShippingClassList(ctx.fetch_listing(remote.as_ref(), request, page_size).await)
                });
            }
            Action::FetchSingleProductShippingClass(request) => {
                let request = request.clone();
                self.ctx.spawn_request(action, async move {
                    Action::FetchedSingleProductShippingClass(ctx.fetch_single(remote.as_ref(), request).await)
                });
            }
            other => {
                return Err(DispatchFault::new(format!("{} does not handle {}", Self::NAME, other.kind())));
            }
        }
        Ok(())
    }
}
