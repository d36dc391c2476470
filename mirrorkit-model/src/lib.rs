//! Entity model for mirrorkit.
//!
//! Defines the types every mirrored collection is made of:
//! - [`MirrorEntity`]: what the store and reconciler need from an entity kind
//! - [`EntitySchema`]: a kind's table and the fields extracted into columns
//! - [`SortOrder`]: a caller-chosen ordering over an indexed column
//! - the mirrored kinds: [`SitePlugin`], [`Product`], [`ProductReview`], [`ProductCategory`],
//!   [`ProductVariation`] and [`ProductShippingClass`]
//!
//! Entities arrive here already deserialized from the remote API; this crate
//! never talks to the network or the database.

mod category;
mod entity;
mod plugin;
mod product;
mod review;
mod schema;
mod shipping_class;
mod variation;

pub use category::{CategorySorting, ProductCategory};
pub use entity::MirrorEntity;
pub use plugin::SitePlugin;
pub use product::{Product, ProductSorting};
pub use review::ProductReview;
pub use schema::{EntityKind, EntitySchema, FieldType, IndexedField, SortOrder};
pub use shipping_class::ProductShippingClass;
pub use variation::ProductVariation;
