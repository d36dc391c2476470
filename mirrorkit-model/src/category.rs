use crate::entity::MirrorEntity;
use crate::schema::{EntityKind, EntitySchema, IndexedField, SortOrder};
use mirrorkit_types::{ScopeId, StableKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductCategory {
    pub local_site_id: ScopeId,
    pub remote_category_id: i64,
    pub name: String,
    pub slug: String,
    /// Remote id of the parent category, `0` at the top level.
    pub parent: i64,
}

impl ProductCategory {
    pub fn new(remote_category_id: i64, name: impl Into<String>) -> Self {
        Self {
            remote_category_id,
            name: name.into(),
            ..Self::default()
        }
    }
}

impl MirrorEntity for ProductCategory {
    const KIND: EntityKind = EntityKind::ProductCategory;

    fn schema() -> EntitySchema {
        EntitySchema::new(Self::KIND)
            .with_field(IndexedField::integer("/remote_category_id"))
            .with_field(IndexedField::text("/name"))
            .with_field(IndexedField::text("/slug"))
            .with_field(IndexedField::integer("/parent"))
    }

    fn local_parent_id(&self) -> ScopeId {
        self.local_site_id
    }

    fn set_local_parent_id(&mut self, scope: ScopeId) {
        self.local_site_id = scope;
    }

    fn stable_key(&self) -> StableKey {
        StableKey::remote(self.remote_category_id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategorySorting {
    #[default]
    NameAsc,
    NameDesc,
}

impl CategorySorting {
    pub fn sort_order(self) -> SortOrder {
        match self {
            CategorySorting::NameAsc => SortOrder::asc("/name"),
            CategorySorting::NameDesc => SortOrder::desc("/name"),
        }
    }
}
