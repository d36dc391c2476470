use crate::entity::MirrorEntity;
use crate::schema::{EntityKind, EntitySchema, IndexedField, SortOrder};
use mirrorkit_types::{ScopeId, StableKey};
use serde::{Deserialize, Serialize};

/// One purchasable variant of a `variable` product.
///
/// Variations are scoped by the local id of the product they belong to, not
/// by the site: clearing one product's variations never touches another's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductVariation {
    pub local_product_id: ScopeId,
    pub remote_product_id: i64,
    pub remote_variation_id: i64,
    pub sku: String,
    pub permalink: String,
    pub status: String,
    pub price: String,
    pub regular_price: String,
    pub sale_price: String,
    pub on_sale: bool,
    pub manage_stock: bool,
    pub stock_quantity: i64,
    pub stock_status: String,
    /// Attribute choices as sent by the remote, e.g. `[{"name":"Size","option":"L"}]`.
    pub attributes: String,
    pub menu_order: i64,
    pub date_created: String,
    pub date_modified: String,
}

impl ProductVariation {
    pub fn new(remote_product_id: i64, remote_variation_id: i64) -> Self {
        Self {
            remote_product_id,
            remote_variation_id,
            ..Self::default()
        }
    }

    /// Order the remote shows variations in.
    pub fn menu_order() -> SortOrder {
        SortOrder::asc("/menu_order")
    }
}

impl MirrorEntity for ProductVariation {
    const KIND: EntityKind = EntityKind::ProductVariation;

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::KIND)
            .with_field(IndexedField::integer("/remote_variation_id"))
            .with_field(IndexedField::integer("/remote_product_id"))
            .with_field(IndexedField::text("/sku"))
            .with_field(IndexedField::integer("/menu_order"))
    }

    fn local_parent_id(&self) -> ScopeId {
        self.local_product_id
    }

    fn set_local_parent_id(&mut self, scope: ScopeId) {
        self.local_product_id = scope;
    }

    fn stable_key(&self) -> StableKey {
        StableKey::remote(self.remote_variation_id)
    }
}
