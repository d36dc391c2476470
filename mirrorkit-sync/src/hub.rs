//! Process-wide wiring: one dispatcher, one store, one facade per kind.

use crate::action::Action;
use crate::config::MirrorConfig;
use crate::dispatcher::{Dispatcher, SubscriptionId};
use crate::error::{SyncError, SyncResult};
use crate::facade::{
    FacadeContext, ProductCategoryStore, ProductReviewStore, ProductShippingClassStore, ProductStore,
    ProductVariationStore, SitePluginStore, StoreFacade,
};
use crate::remote::RemoteCollection;
use mirrorkit_model::{
    Product, ProductCategory, ProductReview, ProductShippingClass, ProductVariation, SitePlugin,
};
use mirrorkit_storage::{LocalStore, MirrorStore};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{info, warn};

/// Builds a [`MirrorHub`]. Only kinds given a remote get a facade.
pub struct MirrorHubBuilder<S = MirrorStore> {
    store: Arc<S>,
    config: MirrorConfig,
    runtime: Option<Handle>,
    plugins: Option<Arc<dyn RemoteCollection<SitePlugin>>>,
    products: Option<Arc<dyn RemoteCollection<Product>>>,
    reviews: Option<Arc<dyn RemoteCollection<ProductReview>>>,
    categories: Option<Arc<dyn RemoteCollection<ProductCategory>>>,
    variations: Option<Arc<dyn RemoteCollection<ProductVariation>>>,
    shipping_classes: Option<Arc<dyn RemoteCollection<ProductShippingClass>>>,
}

impl MirrorHubBuilder<MirrorStore> {
    /// Opens the store described by `config.storage`.
    pub fn from_config(config: MirrorConfig) -> SyncResult<Self> {
        config.validate()?;
        let store = MirrorStore::open_with_config(&config.storage)?;
        Ok(MirrorHub::builder(Arc::new(store), config))
    }
}

impl<S: LocalStore> MirrorHubBuilder<S> {
    /// Runtime for remote calls. Defaults to the runtime `build` runs on.
    #[must_use]
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    #[must_use]
    pub fn site_plugins(mut self, remote: Arc<dyn RemoteCollection<SitePlugin>>) -> Self {
        self.plugins = Some(remote);
        self
    }

    #[must_use]
    pub fn products(mut self, remote: Arc<dyn RemoteCollection<Product>>) -> Self {
        self.products = Some(remote);
        self
    }

    #[must_use]
    pub fn product_reviews(mut self, remote: Arc<dyn RemoteCollection<ProductReview>>) -> Self {
        self.reviews = Some(remote);
        self
    }

    #[must_use]
    pub fn product_categories(mut self, remote: Arc<dyn RemoteCollection<ProductCategory>>) -> Self {
        self.categories = Some(remote);
        self
    }

    #[must_use]
    pub fn product_variations(mut self, remote: Arc<dyn RemoteCollection<ProductVariation>>) -> Self {
        self.variations = Some(remote);
        self
    }

    #[must_use]
    pub fn product_shipping_classes(mut self, remote: Arc<dyn RemoteCollection<ProductShippingClass>>) -> Self {
        self.shipping_classes = Some(remote);
        self
    }

    /// Creates the dispatcher and registers the facades on it.
    pub fn build(self) -> SyncResult<MirrorHub<S>> {
        self.config.validate()?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| SyncError::NoRuntime)?,
        };
        let config = Arc::new(self.config);
        let dispatcher = Arc::new(Dispatcher::new());
        let ctx = FacadeContext::new(
            Arc::clone(&dispatcher),
            Arc::clone(&self.store),
            runtime,
            Arc::clone(&config),
        );

        let mut subscriptions = Vec::new();
        let plugins = self
            .plugins
            .map(|remote| register(&dispatcher, &mut subscriptions, SitePluginStore::new(ctx.clone(), remote)))
            .transpose()?;
        let products = self
            .products
            .map(|remote| register(&dispatcher, &mut subscriptions, ProductStore::new(ctx.clone(), remote)))
            .transpose()?;
        let reviews = self
            .reviews
            .map(|remote| register(&dispatcher, &mut subscriptions, ProductReviewStore::new(ctx.clone(), remote)))
            .transpose()?;
        let categories = self
            .categories
            .map(|remote| register(&dispatcher, &mut subscriptions, ProductCategoryStore::new(ctx.clone(), remote)))
            .transpose()?;
        let variations = self
            .variations
            .map(|remote| register(&dispatcher, &mut subscriptions, ProductVariationStore::new(ctx.clone(), remote)))
            .transpose()?;
        let shipping_classes = self
            .shipping_classes
            .map(|remote| {
                register(&dispatcher, &mut subscriptions, ProductShippingClassStore::new(ctx.clone(), remote))
            })
            .transpose()?;

        info!(facades = subscriptions.len(), "mirror hub started");
        Ok(MirrorHub {
            dispatcher,
            store: self.store,
            config,
            ctx,
            plugins,
            products,
            reviews,
            categories,
            variations,
            shipping_classes,
            subscriptions,
        })
    }
}

fn register<F: StoreFacade + 'static>(
    dispatcher: &Dispatcher,
    subscriptions: &mut Vec<SubscriptionId>,
    facade: F,
) -> SyncResult<Arc<F>> {
    let facade = Arc::new(facade);
    let handler = Arc::clone(&facade);
    let id = dispatcher.register_owner(facade.handled_kinds(), Arc::new(move |action: &Action| handler.on_action(action)))?;
    subscriptions.push(id);
    info!(store = facade.name(), kinds = facade.handled_kinds().len(), "store registered");
    Ok(facade)
}

/// The running mirror: dispatcher, local store and the registered facades.
///
/// Facades hold the dispatcher and the dispatcher holds the facades'
/// handlers; [`MirrorHub::shutdown`] (or dropping the hub) unsubscribes them
/// and breaks that cycle.
pub struct MirrorHub<S: LocalStore = MirrorStore> {
    dispatcher: Arc<Dispatcher>,
    store: Arc<S>,
    config: Arc<MirrorConfig>,
    ctx: FacadeContext<S>,
    plugins: Option<Arc<SitePluginStore<S>>>,
    products: Option<Arc<ProductStore<S>>>,
    reviews: Option<Arc<ProductReviewStore<S>>>,
    categories: Option<Arc<ProductCategoryStore<S>>>,
    variations: Option<Arc<ProductVariationStore<S>>>,
    shipping_classes: Option<Arc<ProductShippingClassStore<S>>>,
    subscriptions: Vec<SubscriptionId>,
}

impl<S: LocalStore> MirrorHub<S> {
    pub fn builder(store: Arc<S>, config: MirrorConfig) -> MirrorHubBuilder<S> {
        MirrorHubBuilder {
            store,
            config,
            runtime: None,
            plugins: None,
            products: None,
            reviews: None,
            categories: None,
            variations: None,
            shipping_classes: None,
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn site_plugins(&self) -> Option<&SitePluginStore<S>> {
        self.plugins.as_deref()
    }

    pub fn products(&self) -> Option<&ProductStore<S>> {
        self.products.as_deref()
    }

    pub fn product_reviews(&self) -> Option<&ProductReviewStore<S>> {
        self.reviews.as_deref()
    }

    pub fn product_categories(&self) -> Option<&ProductCategoryStore<S>> {
        self.categories.as_deref()
    }

    pub fn product_variations(&self) -> Option<&ProductVariationStore<S>> {
        self.variations.as_deref()
    }

    pub fn product_shipping_classes(&self) -> Option<&ProductShippingClassStore<S>> {
        self.shipping_classes.as_deref()
    }

    pub fn dispatch(&self, action: Action) {
        self.dispatcher.dispatch(action);
    }

    pub async fn dispatch_and_wait(&self, action: Action) -> SyncResult<Action> {
        self.dispatcher.dispatch_and_wait(action).await
    }

    /// Requests started but not yet answered.
    pub fn in_flight(&self) -> usize {
        self.ctx.in_flight()
    }

    /// Stops the hub.
    ///
    /// New requests are answered with an error result from then on. Running
    /// requests get up to `shutdown_timeout_ms` to deliver their results,
    /// after which the facades are unsubscribed either way.
    pub async fn shutdown(mut self) -> SyncResult<()> {
        self.ctx.close();
        let drained = tokio::time::timeout(self.config.shutdown_timeout(), self.ctx.wait_idle()).await;
        self.unsubscribe_all();
        match drained {
            Ok(()) => {
                info!("mirror hub shut down");
                Ok(())
            }
            Err(_) => {
                let in_flight = self.ctx.in_flight();
                warn!(in_flight, "mirror hub shutdown timed out");
                Err(SyncError::ShutdownTimeout(in_flight))
            }
        }
    }

    fn unsubscribe_all(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.dispatcher.unsubscribe(id);
        }
    }
}

impl<S: LocalStore> Drop for MirrorHub<S> {
    fn drop(&mut self) {
        self.ctx.close();
        self.unsubscribe_all();
    }
}
