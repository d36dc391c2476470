use crate::entity::MirrorEntity;
use crate::schema::{EntityKind, EntitySchema, IndexedField};
use mirrorkit_types::{ScopeId, StableKey};
use serde::{Deserialize, Serialize};

/// A customer review of a product. Reviews are scoped to the site, not the
/// product, so a site-wide listing can be replaced in one unit of work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductReview {
    pub local_site_id: ScopeId,
    pub remote_review_id: i64,
    pub remote_product_id: i64,
    pub date_created: String,
    /// `approved`, `hold`, `spam` or `trash`.
    pub status: String,
    pub reviewer_name: String,
    pub reviewer_email: String,
    pub review: String,
    pub rating: i32,
    pub verified: bool,
}

impl ProductReview {
    pub fn new(remote_review_id: i64, remote_product_id: i64) -> Self {
        Self {
            remote_review_id,
            remote_product_id,
            status: "approved".into(),
            ..Self::default()
        }
    }

    /// Spam and trashed reviews are not kept in the local mirror.
    pub fn is_spam_or_trash(&self) -> bool {
        self.status.eq_ignore_ascii_case("spam") || self.status.eq_ignore_ascii_case("trash")
    }
}

impl MirrorEntity for ProductReview {
    const KIND: EntityKind = EntityKind::ProductReview;

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::KIND)
            .with_field(IndexedField::integer("/remote_review_id"))
            .with_field(IndexedField::integer("/remote_product_id"))
            .with_field(IndexedField::text("/status"))
            .with_field(IndexedField::text("/date_created"))
            .with_field(IndexedField::integer("/rating"))
    }

    fn local_parent_id(&self) -> ScopeId {
        self.local_site_id
    }

    fn set_local_parent_id(&mut self, scope: ScopeId) {
        self.local_site_id = scope;
    }

    fn stable_key(&self) -> StableKey {
        StableKey::remote(self.remote_review_id)
    }
}
