use serde::{Deserialize, Serialize};
use std::fmt;

/// The mirrored entity kinds. Each kind is stored in its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    SitePlugin,
    Product,
    ProductReview,
    ProductCategory,
    ProductVariation,
    ProductShippingClass,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::SitePlugin,
        EntityKind::Product,
        EntityKind::ProductReview,
        EntityKind::ProductCategory,
        EntityKind::ProductVariation,
        EntityKind::ProductShippingClass,
    ];

    /// Table holding every entity of this kind, across all scopes.
    pub const fn table_name(self) -> &'static str {
        match self {
            EntityKind::SitePlugin => "site_plugins",
            EntityKind::Product => "products",
            EntityKind::ProductReview => "product_reviews",
            EntityKind::ProductCategory => "product_categories",
            EntityKind::ProductVariation => "product_variations",
            EntityKind::ProductShippingClass => "product_shipping_classes",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::SitePlugin => "site_plugin",
            EntityKind::Product => "product",
            EntityKind::ProductReview => "product_review",
            EntityKind::ProductCategory => "product_category",
            EntityKind::ProductVariation => "product_variation",
            EntityKind::ProductShippingClass => "product_shipping_class",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes how an entity kind is laid out in the local store.
///
/// The full entity is always persisted as JSON; the indexed fields are
/// additionally extracted into typed columns so they can be ordered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub indexed_fields: Vec<IndexedField>,
}

impl EntitySchema {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            indexed_fields: Vec::new(),
        }
    }

    /// Adds an indexed field.
    #[must_use]
    pub fn with_field(mut self, field: IndexedField) -> Self {
        self.indexed_fields.push(field);
        self
    }

    /// Looks up an indexed field by its JSON pointer path.
    pub fn field(&self, field_path: &str) -> Option<&IndexedField> {
        self.indexed_fields.iter().find(|f| f.field_path == field_path)
    }
}

/// A field extracted from entity JSON into its own column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedField {
    /// JSON pointer path (e.g., "/name", "/date_created").
    pub field_path: String,
    /// Column name, derived from the pointer path.
    pub column: String,
    pub field_type: FieldType,
}

impl IndexedField {
    fn simple(path: &str, field_type: FieldType) -> Self {
        Self {
            field_path: path.into(),
            column: column_for(path),
            field_type,
        }
    }

    /// Shorthand for a text field.
    pub fn text(path: &str) -> Self {
        Self::simple(path, FieldType::Text)
    }

    /// Shorthand for an integer field.
    pub fn integer(path: &str) -> Self {
        Self::simple(path, FieldType::Integer)
    }

    /// Shorthand for a floating point field.
    pub fn real(path: &str) -> Self {
        Self::simple(path, FieldType::Real)
    }

    /// Shorthand for a boolean field.
    pub fn bool(path: &str) -> Self {
        Self::simple(path, FieldType::Bool)
    }

    /// Extracts this field's value from an entity's JSON form.
    pub fn extract<'a>(&self, data: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        data.pointer(&self.field_path).filter(|v| !v.is_null())
    }
}

/// "/a/b" -> "f_a_b". The prefix keeps indexed columns clear of the store's
/// own bookkeeping columns.
fn column_for(path: &str) -> String {
    let mut column = String::from("f");
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        column.push('_');
        column.extend(
            segment
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' }),
        );
    }
    column
}

/// Storage type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Real,
    Bool,
}

impl FieldType {
    /// SQL column affinity.
    pub const fn sql_type(self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Integer | FieldType::Bool => "INTEGER",
            FieldType::Real => "REAL",
        }
    }
}

/// A caller-chosen ordering on one indexed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    /// JSON pointer path of the indexed field to order by.
    pub field_path: String,
    pub descending: bool,
}

impl SortOrder {
    pub fn asc(field_path: &str) -> Self {
        Self {
            field_path: field_path.into(),
            descending: false,
        }
    }

    pub fn desc(field_path: &str) -> Self {
        Self {
            field_path: field_path.into(),
            descending: true,
        }
    }
}
