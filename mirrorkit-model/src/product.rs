use crate::entity::MirrorEntity;
use crate::schema::{EntityKind, EntitySchema, IndexedField, SortOrder};
use mirrorkit_types::{ScopeId, StableKey};
use serde::{Deserialize, Serialize};

/// A catalog item of a store site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub local_site_id: ScopeId,
    pub remote_product_id: i64,
    pub name: String,
    pub slug: String,
    pub permalink: String,
    pub sku: String,
    /// `simple`, `grouped`, `external` or `variable`.
    pub product_type: String,
    /// `draft`, `pending`, `private` or `publish`.
    pub status: String,
    pub catalog_visibility: String,
    pub featured: bool,
    pub description: String,
    pub short_description: String,
    pub price: String,
    pub regular_price: String,
    pub sale_price: String,
    pub on_sale: bool,
    pub total_sales: i64,
    pub manage_stock: bool,
    pub stock_quantity: i64,
    /// `instock`, `outofstock` or `onbackorder`.
    pub stock_status: String,
    pub average_rating: String,
    pub rating_count: i64,
    pub date_created: String,
    pub date_modified: String,
}

impl Product {
    pub fn new(remote_product_id: i64, name: impl Into<String>) -> Self {
        Self {
            remote_product_id,
            name: name.into(),
            ..Self::default()
        }
    }
}

impl MirrorEntity for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::KIND)
            .with_field(IndexedField::integer("/remote_product_id"))
            .with_field(IndexedField::text("/name"))
            .with_field(IndexedField::text("/sku"))
            .with_field(IndexedField::text("/product_type"))
            .with_field(IndexedField::text("/status"))
            .with_field(IndexedField::text("/stock_status"))
            .with_field(IndexedField::text("/date_created"))
    }

    fn local_parent_id(&self) -> ScopeId {
        self.local_site_id
    }

    fn set_local_parent_id(&mut self, scope: ScopeId) {
        self.local_site_id = scope;
    }

    fn stable_key(&self) -> StableKey {
        StableKey::remote(self.remote_product_id)
    }
}

/// Orderings offered for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSorting {
    #[default]
    TitleAsc,
    TitleDesc,
    DateAsc,
    DateDesc,
}

impl ProductSorting {
    pub fn sort_order(self) -> SortOrder {
        match self {
            ProductSorting::TitleAsc => SortOrder::asc("/name"),
            ProductSorting::TitleDesc => SortOrder::desc("/name"),
            ProductSorting::DateAsc => SortOrder::asc("/date_created"),
            ProductSorting::DateDesc => SortOrder::desc("/date_created"),
        }
    }

    /// Value of the remote listing's `orderby`/`order` pair.
    pub const fn remote_params(self) -> (&'static str, &'static str) {
        match self {
            ProductSorting::TitleAsc => ("title", "asc"),
            ProductSorting::TitleDesc => ("title", "desc"),
            ProductSorting::DateAsc => ("date", "asc"),
            ProductSorting::DateDesc => ("date", "desc"),
        }
    }
}
