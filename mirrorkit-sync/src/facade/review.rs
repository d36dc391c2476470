use super::{FacadeContext, StoreFacade};
use crate::action::{Action, ActionKind};
use crate::error::DispatchFault;
use crate::remote::RemoteCollection;
use mirrorkit_model::ProductReview;
use mirrorkit_storage::{LocalStore, MirrorStore, StorageResult};
use mirrorkit_types::{ScopeId, StableKey};
use std::sync::Arc;

/// Mirror of product reviews, scoped to the site.
///
/// Reviews whose confirmed status is spam or trash are removed locally
/// instead of being stored.
pub struct ProductReviewStore<S = MirrorStore> {
    ctx: FacadeContext<S>,
    remote: Arc<dyn RemoteCollection<ProductReview>>,
}

impl<S: LocalStore> ProductReviewStore<S> {
    pub const NAME: &'static str = "product_reviews";

    const KINDS: &'static [ActionKind] = &[
        ActionKind::FetchProductReviews,
        ActionKind::FetchSingleProductReview,
        ActionKind::UpdateProductReviewStatus,
    ];

    pub fn new(ctx: FacadeContext<S>, remote: Arc<dyn RemoteCollection<ProductReview>>) -> Self {
        Self { ctx, remote }
    }

    pub fn get_reviews_for_site(&self, site: ScopeId) -> StorageResult<Vec<ProductReview>> {
        self.ctx.store().read_all_for_scope(site)
    }

    pub fn get_reviews_for_product(&self, site: ScopeId, remote_product_id: i64) -> StorageResult<Vec<ProductReview>> {
        let mut reviews = self.get_reviews_for_site(site)?;
        reviews.retain(|r| r.remote_product_id == remote_product_id);
        Ok(reviews)
    }

    pub fn get_review_by_remote_id(&self, site: ScopeId, remote_review_id: i64) -> StorageResult<Option<ProductReview>> {
        self.ctx.store().get_by_key(site, &StableKey::remote(remote_review_id))
    }

    pub fn delete_reviews_for_site(&self, site: ScopeId) -> StorageResult<usize> {
        self.ctx.store().delete_all_for_scope::<ProductReview>(site)
    }
}

impl<S: LocalStore> StoreFacade for ProductReviewStore<S> {
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
            Action::FetchProductReviews(request) => {
                let request = request.clone();
                let page_size = ctx.config().review_page_size;
                self.ctx.spawn_request(action, async move {
                    Action::FetchedProductReviews(ctx.fetch_listing(remote.as_ref(), request, page_size).await)
                });
            }
            Action::FetchSingleProductReview(request) => {
                let request = request.clone();
                self.ctx.spawn_request(action, async move {
                    Action::FetchedSingleProductReview(ctx.fetch_single(remote.as_ref(), request).await)
                });
            }
            Action::UpdateProductReviewStatus(request) => {
                let request = request.clone();
                self.ctx.spawn_request(action, async move {
                    let outcome = ctx
                        .mutate(remote.as_ref(), request, |r, site, review: &ProductReview| {
                            if review.is_spam_or_trash() {
                                r.remove_single(site, review)
                            } else {
                                r.upsert_single(site, Some(review))
                            }
                        })
                        .await;
                    Action::UpdatedProductReviewStatus(outcome)
                });
            }
            other => {
                return Err(DispatchFault::new(format!("{} does not handle {}", Self::NAME, other.kind())));
            }
        }
        Ok(())
    }
}
